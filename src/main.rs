// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{env, net::SocketAddr};

use sessiongate::{
    api::router,
    auth::TokenCodec,
    config::{self, TokenConfig},
    ident::allocate_user_id,
    models::{normalize_email, UserRecord},
    state::AppState,
    store::UserDirectory,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let token_config = TokenConfig::from_env();
    let mut directory = UserDirectory::new();

    // Optional bootstrap user so a fresh instance can be logged into.
    if let (Ok(email), Ok(password)) = (env::var("SEED_USER_EMAIL"), env::var("SEED_USER_PASSWORD")) {
        let id = allocate_user_id(&directory).expect("empty directory always has a free id");
        directory.insert_user(UserRecord {
            id,
            name: env::var("SEED_USER_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            email: normalize_email(&email),
            password,
            phone: None,
            blocked_since: None,
            access_token: None,
            refresh_token: None,
        });
        tracing::info!(user_id = %id, "Seeded bootstrap user");
    }

    let state = AppState::new(directory, TokenCodec::new(&token_config));
    let app = router(state);

    let host = env::var(config::HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(config::PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Sessiongate listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(config::LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}
