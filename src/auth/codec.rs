// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token codec: signing and verification of the two token classes.
//!
//! Pure crypto, no side effects. Verification reports a uniform `None` for
//! every failure mode (malformed, expired, wrong signature, wrong class) so
//! callers cannot be used as an oracle for why a token was rejected.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::TokenConfig;
use crate::models::UserId;

use super::claims::{AccessClaims, RefreshClaims, REFRESH_TOKEN_CLASS};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// One signing context: a key pair plus the lifetime for its token class.
struct SigningContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SigningContext {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }
}

/// Signs and verifies access and refresh tokens with independent secrets
/// and lifetimes.
pub struct TokenCodec {
    access: SigningContext,
    refresh: SigningContext,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: SigningContext::new(&config.access_secret, config.access_ttl_secs),
            refresh: SigningContext::new(&config.refresh_secret, config.refresh_ttl_secs),
        }
    }

    /// Access token lifetime in seconds, reported to clients as `expires_in`.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access.ttl_secs
    }

    pub fn issue_access_token(
        &self,
        user_id: UserId,
        email: &str,
        name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.0,
            email: email.to_string(),
            name: name.to_string(),
            iat: now,
            exp: now + self.access.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.access.encoding)
    }

    pub fn issue_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: user_id.0,
            cls: REFRESH_TOKEN_CLASS.to_string(),
            iat: now,
            exp: now + self.refresh.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.refresh.encoding)
    }

    /// Verify signature and expiry of an access token.
    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(token, &self.access.decoding, &validation())
            .ok()
            .map(|data| data.claims)
    }

    /// Verify signature, expiry and class of a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> Option<RefreshClaims> {
        let claims = decode::<RefreshClaims>(token, &self.refresh.decoding, &validation())
            .ok()
            .map(|data| data.claims)?;
        if claims.cls != REFRESH_TOKEN_CLASS {
            return None;
        }
        Some(claims)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&TokenConfig::default())
    }

    #[test]
    fn access_token_round_trips() {
        let codec = codec();
        let token = codec
            .issue_access_token(UserId(5), "ana@x.com", "Ana")
            .unwrap();

        let claims = codec.verify_access_token(&token).expect("token verifies");
        assert_eq!(claims.sub, 5);
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.exp - claims.iat, codec.access_ttl_secs());
    }

    #[test]
    fn refresh_token_round_trips_with_class() {
        let codec = codec();
        let token = codec.issue_refresh_token(UserId(5)).unwrap();

        let claims = codec.verify_refresh_token(&token).expect("token verifies");
        assert_eq!(claims.sub, 5);
        assert_eq!(claims.cls, REFRESH_TOKEN_CLASS);
    }

    #[test]
    fn tokens_do_not_cross_contexts() {
        let codec = codec();
        let access = codec
            .issue_access_token(UserId(5), "ana@x.com", "Ana")
            .unwrap();
        let refresh = codec.issue_refresh_token(UserId(5)).unwrap();

        // Independent secrets: neither class verifies in the other context.
        assert!(codec.verify_refresh_token(&access).is_none());
        assert!(codec.verify_access_token(&refresh).is_none());
    }

    #[test]
    fn class_check_rejects_access_style_claims_under_shared_secret() {
        // Worst-case deployment where both contexts share one secret: the
        // class discriminator still keeps access tokens out of the refresh
        // path.
        let config = TokenConfig {
            refresh_secret: "access-secret-key".to_string(),
            ..TokenConfig::default()
        };
        let codec = TokenCodec::new(&config);

        let access = codec
            .issue_access_token(UserId(5), "ana@x.com", "Ana")
            .unwrap();
        assert!(codec.verify_refresh_token(&access).is_none());
    }

    #[test]
    fn expired_token_is_invalid() {
        let config = TokenConfig::default();
        let codec = TokenCodec::new(&config);

        // Hand-craft a token expired beyond the leeway window.
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: 5,
            email: "ana@x.com".to_string(),
            name: "Ana".to_string(),
            iat: now - 7_200,
            exp: now - 3_600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.access_secret.as_bytes()),
        )
        .unwrap();

        assert!(codec.verify_access_token(&token).is_none());
    }

    #[test]
    fn garbage_and_tampered_tokens_are_invalid() {
        let codec = codec();
        assert!(codec.verify_access_token("not-a-token").is_none());
        assert!(codec.verify_refresh_token("").is_none());

        let token = codec
            .issue_access_token(UserId(5), "ana@x.com", "Ana")
            .unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(codec.verify_access_token(&tampered).is_none());
    }
}
