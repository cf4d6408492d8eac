// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory user directory.
//!
//! This module stands in for the external relational store. Its inherent
//! methods are the canonical store contract consumed by the session
//! orchestrator: one explicit operation per logical call, each executed as a
//! single round trip so no partial-slot state is ever observable.
//!
//! Credential comparison happens here (store-side), never in the caller.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::{normalize_email, TokenSlots, UserId, UserProfile, UserRecord};

#[derive(Default)]
pub struct UserDirectory {
    users: HashMap<UserId, UserRecord>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Lookup operations
    // =========================================================================

    /// Find a user by email, case- and whitespace-insensitively.
    pub fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        let needle = normalize_email(email);
        self.users
            .values()
            .find(|user| user.email == needle)
            .cloned()
    }

    pub fn get_user_by_id(&self, user_id: UserId) -> Option<UserRecord> {
        self.users.get(&user_id).cloned()
    }

    /// The user's "blocked since" timestamp, if any. `None` means either the
    /// user does not exist or is not blocked; the caller checks existence
    /// first.
    pub fn get_block_status(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.users.get(&user_id).and_then(|user| user.blocked_since)
    }

    /// Verify credentials, returning the matching record on success.
    /// The comparison is performed store-side; an empty result means the
    /// password was wrong.
    pub fn check_credentials(&self, email: &str, password: &str) -> Option<UserRecord> {
        let needle = normalize_email(email);
        self.users
            .values()
            .find(|user| user.email == needle && user.password == password)
            .cloned()
    }

    // =========================================================================
    // Token slot operations
    // =========================================================================

    /// Overwrite both token slots for a user. Last write wins; writing the
    /// same pair twice is a no-op. Unknown users are ignored so the
    /// operation stays idempotent from the caller's perspective.
    pub fn persist_token_pair(
        &mut self,
        user_id: UserId,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) {
        if let Some(user) = self.users.get_mut(&user_id) {
            user.access_token = access_token;
            user.refresh_token = refresh_token;
        }
    }

    /// Read back the persisted token slots for a user.
    pub fn get_token_slots(&self, user_id: UserId) -> Option<TokenSlots> {
        self.users.get(&user_id).map(|user| TokenSlots {
            access_token: user.access_token.clone(),
            refresh_token: user.refresh_token.clone(),
        })
    }

    /// Set both slots absent. Used by logout, revocation and every refresh
    /// failure path. Clearing an already-clear user succeeds.
    pub fn clear_token_slots(&mut self, user_id: UserId) {
        self.persist_token_pair(user_id, None, None);
    }

    // =========================================================================
    // User management operations
    // =========================================================================

    pub fn insert_user(&mut self, record: UserRecord) {
        self.users.insert(record.id, record);
    }

    pub fn user_exists(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn email_exists(&self, email: &str) -> bool {
        let needle = normalize_email(email);
        self.users.values().any(|user| user.email == needle)
    }

    pub fn count_users(&self) -> usize {
        self.users.len()
    }

    /// List users ordered by id, optionally filtered by a name/email
    /// substring, with 1-based pagination.
    pub fn list_users(&self, search: Option<&str>, page: u32, limit: u32) -> (Vec<UserProfile>, usize) {
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut matches: Vec<&UserRecord> = self
            .users
            .values()
            .filter(|user| match &needle {
                Some(needle) => {
                    user.name.to_lowercase().contains(needle) || user.email.contains(needle)
                }
                None => true,
            })
            .collect();
        matches.sort_by_key(|user| user.id);

        let total = matches.len();
        let start = (page as usize - 1) * limit as usize;
        let profiles = matches
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .map(UserProfile::from)
            .collect();

        (profiles, total)
    }

    /// Mark a user as blocked from `now` on. Blocking does not touch the
    /// token slots: an existing session stays valid until the access token
    /// expires, since block status is only checked at login.
    pub fn block_user(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<UserProfile, ApiError> {
        let Some(user) = self.users.get_mut(&user_id) else {
            return Err(ApiError::not_found("User not found"));
        };
        user.blocked_since = Some(now);
        Ok(UserProfile::from(&*user))
    }
}

#[cfg(test)]
pub(crate) fn sample_user(id: i64, email: &str, password: &str) -> UserRecord {
    UserRecord {
        id: UserId(id),
        name: format!("User {id}"),
        email: normalize_email(email),
        password: password.to_string(),
        phone: None,
        blocked_since: None,
        access_token: None,
        refresh_token: None,
    }
}
