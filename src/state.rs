// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{SessionService, TokenCodec};
use crate::config::TokenConfig;
use crate::store::UserDirectory;

/// Shared application state.
///
/// `directory` and `sessions` point at the same underlying store; handlers
/// use `directory` for user management and `sessions` for everything
/// touching tokens.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RwLock<UserDirectory>>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(directory: UserDirectory, codec: TokenCodec) -> Self {
        let directory = Arc::new(RwLock::new(directory));
        let sessions = Arc::new(SessionService::new(directory.clone(), codec));
        Self { directory, sessions }
    }

    /// State with default (development) token configuration.
    pub fn with_directory(directory: UserDirectory) -> Self {
        Self::new(directory, TokenCodec::new(&TokenConfig::default()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_directory(UserDirectory::new())
    }
}
