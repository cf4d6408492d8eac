// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CreateUserRequest, ListUsersResponse, LoginRequest, LoginResponse, LogoutRequest,
        LogoutResponse, RefreshRequest, RefreshResponse, TokenResponse, UserId, UserProfile,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::get_current_user))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}/block", post(users::block_user))
        .with_state(state.clone());

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::refresh,
        users::create_user,
        users::list_users,
        users::get_current_user,
        users::get_user,
        users::block_user,
        health::health,
        health::ready
    ),
    components(
        schemas(
            UserId,
            UserProfile,
            TokenResponse,
            LoginRequest,
            LoginResponse,
            LogoutRequest,
            LogoutResponse,
            RefreshRequest,
            RefreshResponse,
            auth::RefreshRejection,
            CreateUserRequest,
            ListUsersResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, logout and token refresh"),
        (name = "Users", description = "User management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
