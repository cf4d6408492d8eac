// SPDX-License-Identifier: AGPL-3.0-or-later

//! JWT claim sets and the authenticated user representation.

use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// Class discriminator carried by refresh tokens.
pub const REFRESH_TOKEN_CLASS: &str = "refresh";

/// Claims embedded in an access token.
///
/// Access tokens are self-contained: the signature covers the full claim
/// set, and no server-side identifier beyond `sub` is carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the numeric user identifier.
    pub sub: i64,
    pub email: String,
    pub name: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Claims embedded in a refresh token.
///
/// Refresh tokens identify the user and their own class, nothing more; the
/// identity fields are re-resolved from the directory at refresh time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the numeric user identifier.
    pub sub: i64,
    /// Token class; must equal [`REFRESH_TOKEN_CLASS`]. Rejects access
    /// tokens presented as refresh tokens when both contexts share a
    /// secret.
    pub cls: String,
    pub iat: i64,
    pub exp: i64,
}

/// The identity a validated access token resolves to.
///
/// Attached to the request by the [`crate::auth::Auth`] extractor for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    /// Token expiration (Unix timestamp).
    pub expires_at: i64,
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: UserId(claims.sub),
            email: claims.email,
            name: claims.name,
            expires_at: claims.exp,
        }
    }
}
