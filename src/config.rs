// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! token configuration loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_ACCESS_SECRET` | Access token signing secret | `access-secret-key` |
//! | `JWT_REFRESH_SECRET` | Refresh token signing secret | `refresh-secret-key` |
//! | `JWT_ACCESS_TTL_SECS` | Access token lifetime in seconds | `900` (15 min) |
//! | `JWT_REFRESH_TTL_SECS` | Refresh token lifetime in seconds | `604800` (7 days) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the access token signing secret.
pub const ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";

/// Environment variable name for the refresh token signing secret.
pub const REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";

/// Environment variable name for the access token lifetime (seconds).
pub const ACCESS_TTL_ENV: &str = "JWT_ACCESS_TTL_SECS";

/// Environment variable name for the refresh token lifetime (seconds).
pub const REFRESH_TTL_ENV: &str = "JWT_REFRESH_TTL_SECS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Signing secrets and lifetimes for the two token classes.
///
/// Access and refresh tokens use independent secrets, so a token of one
/// class can never pass signature verification in the other context.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl TokenConfig {
    /// Load token configuration from the environment, falling back to the
    /// documented defaults. The default secrets are only suitable for
    /// development.
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var(ACCESS_SECRET_ENV)
                .unwrap_or_else(|_| "access-secret-key".to_string()),
            refresh_secret: env::var(REFRESH_SECRET_ENV)
                .unwrap_or_else(|_| "refresh-secret-key".to_string()),
            access_ttl_secs: parse_ttl(ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl_secs: parse_ttl(REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: "access-secret-key".to_string(),
            refresh_secret: "refresh-secret-key".to_string(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

fn parse_ttl(var: &str, default: i64) -> i64 {
    env::var(var)
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}
