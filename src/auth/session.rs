// SPDX-License-Identifier: AGPL-3.0-or-later

//! Session orchestration: login, refresh, logout, revoke and the token
//! validation entry point consumed by the request guard.
//!
//! Ordering inside one request is load-bearing. Login checks existence,
//! then block status, then credentials: a blocked user must never learn
//! whether their password still works. Validation verifies the signature
//! before consulting the persisted slot, so garbage tokens cannot probe
//! stored values. Every refresh failure clears both slots before the
//! failure is reported (fail-closed).
//!
//! There is no per-user mutual exclusion across concurrent requests:
//! concurrent logins or refreshes for one user race on the persisted slots
//! with last-write-wins semantics.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::claims::AuthenticatedUser;
use crate::auth::codec::TokenCodec;
use crate::auth::error::SessionError;
use crate::models::{email_is_well_formed, TokenPair, UserId, UserProfile, UserRecord};
use crate::store::UserDirectory;

/// The authentication orchestrator.
///
/// Holds no session state of its own: the directory is the single arbiter
/// of which token pair is currently valid.
pub struct SessionService {
    directory: Arc<RwLock<UserDirectory>>,
    codec: TokenCodec,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

impl SessionService {
    pub fn new(directory: Arc<RwLock<UserDirectory>>, codec: TokenCodec) -> Self {
        Self { directory, codec }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Overwrites any previously persisted pair: at most one pair is valid
    /// per user, and a new login invalidates older sessions.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        if !email_is_well_formed(email) {
            return Err(SessionError::Validation {
                field: "email",
                message: "must be a well-formed email address",
            });
        }
        if password.trim().is_empty() {
            return Err(SessionError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }

        let user = self.verify_credentials(email, password).await?;
        let tokens = self.issue_pair(&user)?;

        self.directory.write().await.persist_token_pair(
            user.id,
            Some(tokens.access_token.clone()),
            Some(tokens.refresh_token.clone()),
        );

        tracing::info!(user_id = %user.id, "Login successful");
        Ok(LoginOutcome {
            user: UserProfile::from(&user),
            tokens,
        })
    }

    /// Existence check, then block check, then store-side credential check.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, SessionError> {
        let directory = self.directory.read().await;

        let Some(user) = directory.find_user_by_email(email) else {
            tracing::warn!("Login attempt for unknown user");
            return Err(SessionError::NotFound);
        };

        // Block status is decided before the credential comparison runs.
        if let Some(blocked_since) = directory.get_block_status(user.id) {
            tracing::warn!(user_id = %user.id, %blocked_since, "Login attempt by blocked user");
            return Err(SessionError::Blocked);
        }

        match directory.check_credentials(email, password) {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %user.id, "Login attempt with invalid credentials");
                Err(SessionError::InvalidCredentials)
            }
        }
    }

    fn issue_pair(&self, user: &UserRecord) -> Result<TokenPair, SessionError> {
        let access_token = self
            .codec
            .issue_access_token(user.id, &user.email, &user.name)
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        let refresh_token = self
            .codec
            .issue_refresh_token(user.id)
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Rotate the access token while keeping the presented refresh token.
    ///
    /// Any failure - invalid token, identity mismatch, persisted-slot
    /// disagreement, or an unexpected error - clears both slots before the
    /// error is returned; ambiguity always forces re-authentication.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        claimed_user_id: UserId,
    ) -> Result<TokenPair, SessionError> {
        match self.refresh_inner(refresh_token, claimed_user_id).await {
            Ok(tokens) => {
                tracing::info!(user_id = %claimed_user_id, "Access token refreshed");
                Ok(tokens)
            }
            Err(err) => {
                tracing::warn!(user_id = %claimed_user_id, error = %err, "Refresh failed, revoking session");
                self.revoke(claimed_user_id).await;
                Err(err)
            }
        }
    }

    async fn refresh_inner(
        &self,
        refresh_token: &str,
        claimed_user_id: UserId,
    ) -> Result<TokenPair, SessionError> {
        let Some(claims) = self.codec.verify_refresh_token(refresh_token) else {
            return Err(SessionError::TokenInvalid);
        };

        // A valid token claiming another user's id is tampering.
        if claims.sub != claimed_user_id.0 {
            return Err(SessionError::TokenMismatch);
        }

        let user = {
            let directory = self.directory.read().await;

            let persisted = directory
                .get_token_slots(claimed_user_id)
                .and_then(|slots| slots.refresh_token)
                .ok_or(SessionError::TokenMismatch)?;
            if persisted != refresh_token {
                return Err(SessionError::TokenMismatch);
            }

            // Re-resolve identity fields; name and email may have changed
            // since the pair was issued.
            directory
                .get_user_by_id(claimed_user_id)
                .ok_or(SessionError::NotFound)?
        };

        let access_token = self
            .codec
            .issue_access_token(user.id, &user.email, &user.name)
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        self.directory.write().await.persist_token_pair(
            user.id,
            Some(access_token.clone()),
            Some(refresh_token.to_string()),
        );

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    // =========================================================================
    // Logout / revoke
    // =========================================================================

    /// Clear both token slots unconditionally. Idempotent: logging out an
    /// already-logged-out (or unknown) user succeeds.
    pub async fn logout(&self, user_id: UserId) {
        self.revoke(user_id).await;
        tracing::info!(user_id = %user_id, "Logout complete");
    }

    /// The slot-clearing primitive, also used by refresh failure handling.
    pub async fn revoke(&self, user_id: UserId) {
        self.directory.write().await.clear_token_slots(user_id);
    }

    // =========================================================================
    // Validation (request guard contract)
    // =========================================================================

    /// Full access token validation: signature and expiry first, then a
    /// byte-for-byte match against the persisted access slot. Performs no
    /// mutation.
    pub async fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<AuthenticatedUser, SessionError> {
        let Some(claims) = self.codec.verify_access_token(token) else {
            return Err(SessionError::TokenInvalid);
        };

        let directory = self.directory.read().await;
        let persisted = directory
            .get_token_slots(UserId(claims.sub))
            .and_then(|slots| slots.access_token)
            .ok_or(SessionError::TokenMismatch)?;
        if persisted != token {
            return Err(SessionError::TokenMismatch);
        }

        Ok(AuthenticatedUser::from(claims))
    }
}
