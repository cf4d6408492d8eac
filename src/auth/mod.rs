// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Authentication Module
//!
//! Session authentication built on a dual-token scheme:
//!
//! 1. `POST /v1/auth/login` verifies credentials (existence check, block
//!    check, then store-side credential check, strictly in that order) and
//!    issues an access/refresh token pair.
//! 2. The pair is persisted on the user record; the persisted value, not
//!    the signature alone, decides whether a token is still valid.
//! 3. Every protected request passes the [`Auth`] extractor: bearer token
//!    out of the header, signature and expiry via the codec, then a
//!    byte-for-byte match against the persisted access slot.
//! 4. `POST /v1/auth/refresh` rotates the access token while keeping the
//!    refresh token; any refresh failure clears both slots (fail-closed).
//!
//! ## Security
//!
//! - Access and refresh tokens use independent signing secrets
//! - The codec reports a uniform failure for malformed, expired,
//!   wrong-signature and wrong-class tokens
//! - Boundary responses never distinguish "expired" from "revoked" from
//!   "signature invalid"

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod session;

pub use claims::AuthenticatedUser;
pub use codec::TokenCodec;
pub use error::{AuthError, SessionError};
pub use extractor::Auth;
pub use session::SessionService;
