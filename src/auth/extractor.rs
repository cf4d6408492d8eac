// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axum extractor for authenticated users — the request guard.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The guard is purely a gate: it extracts the bearer token, has the
//! session service validate it fully (signature, expiry, persisted-slot
//! match) and attaches the resolved identity. It never mutates session
//! state.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthenticatedUser, AuthError};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Rejects with a uniform "authentication required" when no bearer
/// credential is presented and a uniform "authentication failed" when the
/// presented token does not fully validate, without distinguishing expiry
/// from revocation from a bad signature.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A previous layer may already have validated this request.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = state
            .sessions
            .validate_access_token(token)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Request guard rejected token");
                AuthError::from(err)
            })?;

        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}
