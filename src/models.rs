// SPDX-License-Identifier: AGPL-3.0-or-later

//! # API Data Models
//!
//! Request and response data structures used by the REST API, plus the user
//! record held by the directory. All wire types derive `Serialize`,
//! `Deserialize` and `ToSchema` for automatic JSON handling and OpenAPI
//! documentation.
//!
//! ## User Identifier Type
//!
//! The [`UserId`] newtype wraps the numeric user identifier. It provides
//! type safety and clear semantics where ids, pages and timestamps would
//! otherwise all be bare integers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// User Identifier Type
// =============================================================================

/// Numeric user identifier.
///
/// Identifiers are allocated by [`crate::ident::allocate_user_id`] and kept
/// within `i32` range for compatibility with the relational store's integer
/// column.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

// =============================================================================
// User Record
// =============================================================================

/// A user record as held by the directory.
///
/// The two token slots carry the currently valid access and refresh token
/// for this user, raw and unhashed: the persisted value is compared byte for
/// byte against presented tokens. `password` is the store-side credential
/// and never leaves the directory.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Set when the user is barred from logging in. A non-null value blocks
    /// new token pairs but does not invalidate an existing session.
    pub blocked_since: Option<DateTime<Utc>>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// The persisted token slots of one user, as read back from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSlots {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Public view of a user record, safe to serialize.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_since: Option<DateTime<Utc>>,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            blocked_since: record.blocked_since,
        }
    }
}

// =============================================================================
// Token Models
// =============================================================================

/// An access/refresh token pair, always issued and persisted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Wire representation of a token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Always `Bearer`.
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

// =============================================================================
// Auth Requests / Responses
// =============================================================================

/// Request body for `POST /v1/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the resolved identity plus a fresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub tokens: TokenResponse,
}

/// Request body for `POST /v1/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub user_id: UserId,
}

/// Logout confirmation. Logging out an already-logged-out user succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Request body for `POST /v1/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub user_id: UserId,
}

/// Successful refresh: a new access token alongside the unchanged refresh
/// token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub tokens: TokenResponse,
}

// =============================================================================
// User Management Requests / Responses
// =============================================================================

/// Request body for `POST /v1/users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Paged user listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub data: Vec<UserProfile>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

// =============================================================================
// Field Validation
// =============================================================================

/// Minimal well-formedness check for email addresses: one `@` with
/// non-empty, whitespace-free local part and a dotted domain.
pub fn email_is_well_formed(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Phone numbers may contain digits, spaces and `+ - ( )` only.
pub fn phone_is_well_formed(phone: &str) -> bool {
    !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+'))
}

/// Canonical email form used for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
