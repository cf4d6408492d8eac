// SPDX-License-Identifier: AGPL-3.0-or-later

//! Authentication endpoints: login, logout, refresh.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::SessionError,
    error::ApiError,
    models::{
        LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, RefreshRequest,
        RefreshResponse,
    },
    state::AppState,
};

/// Refresh rejection: the caller must discard all local tokens and
/// re-authenticate.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRejection {
    pub must_logout: bool,
    pub error: String,
}

impl IntoResponse for RefreshRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Authenticate with email and password.
///
/// On success a fresh access/refresh pair is issued and persisted,
/// invalidating any previously issued pair for this user. All credential
/// failures collapse into one generic response so callers cannot tell an
/// unknown email from a blocked account from a wrong password.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Token pair and resolved identity", body = LoginResponse),
        (status = 400, description = "Malformed email or empty password"),
        (status = 401, description = "Authentication failed"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state.sessions.login(&request.email, &request.password).await {
        Ok(outcome) => Ok(Json(LoginResponse {
            user: outcome.user,
            tokens: outcome.tokens.into(),
        })),
        Err(err @ SessionError::Validation { .. }) => Err(ApiError::bad_request(err.to_string())),
        Err(err) if err.is_authentication_failure() => {
            // Internally distinguished (already logged by the orchestrator),
            // externally flattened.
            Err(ApiError::unauthorized("Authentication failed"))
        }
        Err(err) => {
            tracing::error!(error = %err, "Login failed unexpectedly");
            Err(ApiError::internal("Internal server error"))
        }
    }
}

/// Drop the user's session by clearing both persisted token slots.
///
/// Idempotent: logging out an already-logged-out user succeeds.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    request_body = LogoutRequest,
    tag = "Auth",
    responses((status = 200, body = LogoutResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Json<LogoutResponse> {
    state.sessions.logout(request.user_id).await;
    Json(LogoutResponse { success: true })
}

/// Exchange a refresh token for a new access token.
///
/// The refresh token itself is kept; only the access slot rotates. Any
/// failure clears both persisted slots and tells the caller to log out.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Rotated token pair", body = RefreshResponse),
        (status = 401, description = "Session revoked, re-authentication required", body = RefreshRejection),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, RefreshRejection> {
    match state
        .sessions
        .refresh(&request.refresh_token, request.user_id)
        .await
    {
        Ok(tokens) => Ok(Json(RefreshResponse {
            tokens: tokens.into(),
        })),
        Err(err) => {
            if !matches!(
                err,
                SessionError::TokenInvalid | SessionError::TokenMismatch | SessionError::NotFound
            ) {
                // Store and internal failures ride the same fail-closed
                // response but are logged distinctly.
                tracing::error!(error = %err, "Refresh failed with non-token error");
            }
            Err(RefreshRejection {
                must_logout: true,
                error: "Refresh token invalid or expired".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::store::{sample_user, UserDirectory};

    fn state_with_user() -> AppState {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(5, "a@x.com", "correct"));
        AppState::with_directory(directory)
    }

    #[tokio::test]
    async fn login_success_returns_pair_and_identity() {
        let state = state_with_user();

        let Json(response) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "a@x.com".into(),
                password: "correct".into(),
            }),
        )
        .await
        .expect("login succeeds");

        assert_eq!(response.user.id, UserId(5));
        assert_eq!(response.tokens.token_type, "Bearer");
        assert!(!response.tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(5, "a@x.com", "correct"));
        let mut blocked = sample_user(6, "b@x.com", "correct");
        blocked.blocked_since = Some(chrono::Utc::now());
        directory.insert_user(blocked);
        let state = AppState::with_directory(directory);

        let cases = [
            ("ghost@x.com", "correct"), // unknown user
            ("a@x.com", "wrong"),       // wrong password
            ("b@x.com", "correct"),     // blocked
        ];
        for (email, password) in cases {
            let err = login(
                State(state.clone()),
                Json(LoginRequest {
                    email: email.into(),
                    password: password.into(),
                }),
            )
            .await
            .unwrap_err();

            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
            assert_eq!(err.message, "Authentication failed");
        }
    }

    #[tokio::test]
    async fn login_validation_error_names_the_field() {
        let state = state_with_user();

        let err = login(
            State(state),
            Json(LoginRequest {
                email: "nonsense".into(),
                password: "pw".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("email"));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let state = state_with_user();

        for _ in 0..2 {
            let Json(response) = logout(
                State(state.clone()),
                Json(LogoutRequest {
                    user_id: UserId(5),
                }),
            )
            .await;
            assert!(response.success);
        }
    }

    #[tokio::test]
    async fn refresh_failure_signals_must_logout_and_clears_slots() {
        let state = state_with_user();
        state.sessions.login("a@x.com", "correct").await.unwrap();

        let rejection = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                refresh_token: "garbage".into(),
                user_id: UserId(5),
            }),
        )
        .await
        .unwrap_err();

        assert!(rejection.must_logout);

        let slots = state
            .directory
            .read()
            .await
            .get_token_slots(UserId(5))
            .unwrap();
        assert_eq!(slots.access_token, None);
        assert_eq!(slots.refresh_token, None);
    }

    #[tokio::test]
    async fn refresh_success_keeps_refresh_token() {
        let state = state_with_user();
        let outcome = state.sessions.login("a@x.com", "correct").await.unwrap();

        let Json(response) = refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: outcome.tokens.refresh_token.clone(),
                user_id: UserId(5),
            }),
        )
        .await
        .expect("refresh succeeds");

        assert_eq!(response.tokens.refresh_token, outcome.tokens.refresh_token);
    }
}
