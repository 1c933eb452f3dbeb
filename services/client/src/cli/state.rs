//! services/client/src/cli/state.rs
//!
//! Defines the application state shared by every command and screen.

use crate::adapters::{FileTokenStore, HttpApiAdapter};
use crate::config::Config;
use crate::error::ClientError;
use docdesk_core::{SessionManager, Workspace};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Created once at startup. The session lives here rather than in a global.
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionManager>,
    pub workspace: Workspace,
}

impl AppState {
    /// Wires the HTTP adapter and file token store into a session and workspace.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let api = Arc::new(HttpApiAdapter::new(
            config.api_url.clone(),
            config.http_timeout,
        )?);
        let store = Arc::new(FileTokenStore::new(config.token_path.clone()));

        let session = Arc::new(SessionManager::new(api.clone(), store));
        let workspace = Workspace::new(session.clone(), api);

        Ok(Self {
            config: Arc::new(config),
            session,
            workspace,
        })
    }

    /// Rehydrates the session from the stored credential.
    ///
    /// An unreachable API is not fatal here: the user simply starts logged out
    /// and the stored credential is kept for the next attempt.
    pub async fn restore_session(&self) {
        debug!(token_path = %self.config.token_path.display(), "Restoring stored session");
        match self.session.restore().await {
            Ok(Some(identity)) => info!(username = %identity, "Resumed stored session"),
            Ok(None) => {}
            Err(e) => warn!("Could not restore the stored session: {}", e),
        }
    }
}
