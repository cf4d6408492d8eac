// SPDX-License-Identifier: AGPL-3.0-or-later

//! User management endpoints.
//!
//! Plain validated CRUD over the directory. Everything except user creation
//! and listing sits behind the request guard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::Auth,
    error::ApiError,
    ident::allocate_user_id,
    models::{
        email_is_well_formed, normalize_email, phone_is_well_formed, CreateUserRequest,
        ListUsersResponse, UserId, UserProfile, UserRecord,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, 1 to 100.
    pub limit: Option<u32>,
    /// Substring filter over name and email.
    pub search: Option<String>,
}

/// Create a user with an allocator-assigned numeric id.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    tag = "Users",
    responses(
        (status = 201, body = UserProfile),
        (status = 400, description = "Validation failed or email already registered"),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    if !email_is_well_formed(&request.email) {
        return Err(ApiError::bad_request("email must be a well-formed email address"));
    }
    if request.password.trim().is_empty() {
        return Err(ApiError::bad_request("password must not be empty"));
    }
    if let Some(phone) = request.phone.as_deref() {
        if !phone_is_well_formed(phone) {
            return Err(ApiError::bad_request(
                "phone may contain only digits, spaces and + - ( )",
            ));
        }
    }

    let mut directory = state.directory.write().await;

    if directory.email_exists(&request.email) {
        return Err(ApiError::bad_request("This email is already registered"));
    }

    let id = allocate_user_id(&directory)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let record = UserRecord {
        id,
        name: request.name.trim().to_string(),
        email: normalize_email(&request.email),
        password: request.password,
        phone: request.phone.map(|p| p.trim().to_string()),
        blocked_since: None,
        access_token: None,
        refresh_token: None,
    };
    let profile = UserProfile::from(&record);
    directory.insert_user(record);

    tracing::info!(user_id = %id, "User created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// List users with pagination and optional search.
#[utoipa::path(
    get,
    path = "/v1/users",
    params(ListUsersQuery),
    tag = "Users",
    responses(
        (status = 200, body = ListUsersResponse),
        (status = 400, description = "Invalid page or limit"),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(30);

    if page < 1 {
        return Err(ApiError::bad_request("page must be a number greater than 0"));
    }
    if !(1..=100).contains(&limit) {
        return Err(ApiError::bad_request("limit must be a number between 1 and 100"));
    }

    let directory = state.directory.read().await;
    let (data, total) = directory.list_users(query.search.as_deref(), page, limit);

    Ok(Json(ListUsersResponse {
        data,
        total,
        page,
        limit,
    }))
}

/// Profile of the currently authenticated user.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 401, description = "Authentication required or failed"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let directory = state.directory.read().await;
    directory
        .get_user_by_id(user.user_id)
        .map(|record| Json(UserProfile::from(&record)))
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Look up one user by id.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "Numeric user identifier")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 401, description = "Authentication required or failed"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    Auth(_user): Auth,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let directory = state.directory.read().await;
    directory
        .get_user_by_id(UserId(user_id))
        .map(|record| Json(UserProfile::from(&record)))
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Bar a user from logging in.
///
/// The block takes effect at the next login; an existing session keeps
/// working until its access token expires.
#[utoipa::path(
    post,
    path = "/v1/users/{user_id}/block",
    params(("user_id" = i64, Path, description = "Numeric user identifier")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 400, description = "Attempt to block own account"),
        (status = 401, description = "Authentication required or failed"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn block_user(
    Auth(actor): Auth,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let target = UserId(user_id);
    if actor.user_id == target {
        return Err(ApiError::bad_request("You cannot block your own account"));
    }

    let mut directory = state.directory.write().await;
    let profile = directory.block_user(target, Utc::now())?;

    tracing::info!(blocked = %target, by = %actor.user_id, "User blocked");
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::store::{sample_user, UserDirectory};

    fn actor(id: i64) -> Auth {
        Auth(AuthenticatedUser {
            user_id: UserId(id),
            email: format!("user{id}@x.com"),
            name: format!("User {id}"),
            expires_at: 0,
        })
    }

    #[tokio::test]
    async fn create_user_assigns_id_and_normalizes_email() {
        let state = AppState::default();

        let (status, Json(profile)) = create_user(
            State(state.clone()),
            Json(CreateUserRequest {
                name: "  Ana  ".into(),
                email: " Ana@X.Com ".into(),
                password: "pw".into(),
                phone: Some("+55 11 91234-5678".into()),
            }),
        )
        .await
        .expect("user creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile.email, "ana@x.com");
        assert_eq!(profile.name, "Ana");
        assert!(profile.id.0 > 0);

        let directory = state.directory.read().await;
        assert!(directory.user_exists(profile.id));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(5, "ana@x.com", "pw"));
        let state = AppState::with_directory(directory);

        let err = create_user(
            State(state),
            Json(CreateUserRequest {
                name: "Ana".into(),
                email: "ANA@x.com".into(),
                password: "pw".into(),
                phone: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_user_validates_fields() {
        let state = AppState::default();
        let base = CreateUserRequest {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: "pw".into(),
            phone: None,
        };

        let mut bad_email = base.clone();
        bad_email.email = "nope".into();
        assert_eq!(
            create_user(State(state.clone()), Json(bad_email))
                .await
                .unwrap_err()
                .status,
            StatusCode::BAD_REQUEST
        );

        let mut bad_password = base.clone();
        bad_password.password = "  ".into();
        assert_eq!(
            create_user(State(state.clone()), Json(bad_password))
                .await
                .unwrap_err()
                .status,
            StatusCode::BAD_REQUEST
        );

        let mut bad_phone = base;
        bad_phone.phone = Some("call me maybe".into());
        assert_eq!(
            create_user(State(state), Json(bad_phone))
                .await
                .unwrap_err()
                .status,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn list_users_validates_pagination() {
        let state = AppState::default();

        let err = list_users(
            State(state.clone()),
            Query(ListUsersQuery {
                page: Some(0),
                limit: None,
                search: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = list_users(
            State(state),
            Query(ListUsersQuery {
                page: None,
                limit: Some(101),
                search: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_users_returns_matches() {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(1, "ana@x.com", "pw"));
        directory.insert_user(sample_user(2, "bob@x.com", "pw"));
        let state = AppState::with_directory(directory);

        let Json(response) = list_users(
            State(state),
            Query(ListUsersQuery {
                page: None,
                limit: None,
                search: Some("bob".into()),
            }),
        )
        .await
        .expect("listing succeeds");

        assert_eq!(response.total, 1);
        assert_eq!(response.data[0].email, "bob@x.com");
    }

    #[tokio::test]
    async fn get_user_not_found() {
        let state = AppState::default();
        let err = get_user(actor(1), Path(42), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn block_user_sets_blocked_since() {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(5, "ana@x.com", "pw"));
        let state = AppState::with_directory(directory);

        let Json(profile) = block_user(actor(1), Path(5), State(state.clone()))
            .await
            .expect("block succeeds");
        assert!(profile.blocked_since.is_some());

        let directory = state.directory.read().await;
        assert!(directory.get_block_status(UserId(5)).is_some());
    }

    #[tokio::test]
    async fn block_user_rejects_self_block() {
        let mut directory = UserDirectory::new();
        directory.insert_user(sample_user(5, "ana@x.com", "pw"));
        let state = AppState::with_directory(directory);

        let err = block_user(actor(5), Path(5), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
