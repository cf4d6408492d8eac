// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sessiongate - Session Authentication & Token Lifecycle Service
//!
//! This crate authenticates users against a credential directory and keeps
//! their session alive through a pair of signed tokens: a short-lived access
//! token presented on every request, and a longer-lived refresh token used
//! only to obtain a new access token.
//!
//! The currently valid pair is persisted on the user record. A token
//! authorizes a request only when its signature verifies *and* it matches
//! the persisted value byte for byte, which is what makes logout and
//! revocation effective despite JWTs being self-contained.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, session orchestration and the request guard
//! - `store` - User directory (credential store stand-in)
//! - `ident` - Collision-checked numeric identifier allocation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod state;
pub mod store;
