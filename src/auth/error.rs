// SPDX-License-Identifier: AGPL-3.0-or-later

//! Authentication errors.
//!
//! [`SessionError`] is the internal taxonomy of the session orchestrator;
//! variants are distinguished for logging and tests but deliberately
//! flattened at the HTTP boundary. [`AuthError`] is what the request guard
//! returns to callers: two coarse signals, "authentication required" and
//! "authentication failed", never revealing which check rejected the token.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Internal failure classification for login, refresh and validation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed input, rejected before any store call.
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    /// No user with the given email.
    #[error("user not found")]
    NotFound,
    /// User exists but is barred from logging in.
    #[error("user is blocked")]
    Blocked,
    /// Credential check came back empty.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Signature, expiry or class failure.
    #[error("token invalid")]
    TokenInvalid,
    /// Signature verified but the persisted slot disagrees.
    #[error("token does not match persisted value")]
    TokenMismatch,
    /// I/O failure talking to the store.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// Anything unclassified.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Login failures that are flattened to one generic "authentication
    /// failed" outcome at the boundary, so callers cannot enumerate
    /// accounts or learn block status.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            SessionError::NotFound | SessionError::Blocked | SessionError::InvalidCredentials
        )
    }
}

/// Request guard rejection.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present.
    MissingAuthHeader,
    /// Authorization header present but not `Bearer <token>`.
    InvalidAuthHeader,
    /// Token rejected: invalid signature, expired, or not matching the
    /// persisted slot. The distinction is intentionally not exposed.
    InvalidToken,
    /// Internal error during validation.
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "authentication_failed",
            AuthError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::StoreUnavailable(msg) | SessionError::Internal(msg) => {
                AuthError::Internal(msg)
            }
            // Everything else collapses into the uniform rejection.
            _ => AuthError::InvalidToken,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authentication required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Authentication failed"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn invalid_token_body_does_not_leak_reason() {
        for err in [
            AuthError::from(SessionError::TokenInvalid),
            AuthError::from(SessionError::TokenMismatch),
            AuthError::from(SessionError::NotFound),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            assert_eq!(body["error"], "Authentication failed");
            assert_eq!(body["error_code"], "authentication_failed");
        }
    }

    #[test]
    fn authentication_failure_classification() {
        assert!(SessionError::NotFound.is_authentication_failure());
        assert!(SessionError::Blocked.is_authentication_failure());
        assert!(SessionError::InvalidCredentials.is_authentication_failure());
        assert!(!SessionError::TokenInvalid.is_authentication_failure());
        assert!(!SessionError::Internal("x".into()).is_authentication_failure());
    }
}
