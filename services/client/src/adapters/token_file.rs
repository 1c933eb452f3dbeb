//! services/client/src/adapters/token_file.rs
//!
//! Durable storage for the bearer credential: a small JSON object on disk with a
//! single `token` key. It implements the `TokenStore` port from the `core` crate.

use async_trait::async_trait;
use docdesk_core::ports::{PortError, PortResult, TokenStore};
use docdesk_core::token::BearerToken;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// A `TokenStore` backed by one JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the target,
/// so a reader never sees a half-written file. Separate processes sharing the
/// file race with last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_error(action: &str, path: &Path, error: impl std::fmt::Display) -> PortError {
    PortError::Storage(format!("failed to {} {}: {}", action, path.display(), error))
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> PortResult<Option<BearerToken>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };

        let stored: StoredSession =
            serde_json::from_str(&raw).map_err(|e| storage_error("parse", &self.path, e))?;
        Ok(stored
            .token
            .filter(|token| !token.trim().is_empty())
            .map(BearerToken::new))
    }

    async fn save(&self, token: &BearerToken) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create", parent, e))?;
        }

        let stored = StoredSession {
            token: Some(token.as_str().to_string()),
        };
        let body = serde_json::to_vec_pretty(&stored)
            .map_err(|e| storage_error("serialize", &self.path, e))?;

        let staging = self.staging_path();
        tokio::fs::write(&staging, body)
            .await
            .map_err(|e| storage_error("write", &staging, e))?;
        restrict_permissions(&staging).await?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;

        debug!(path = %self.path.display(), "Credential stored");
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credential removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

// The file holds a live credential; keep it private to the owner.
#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> PortResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| storage_error("set permissions on", path, e))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> PortResult<()> {
    Ok(())
}
