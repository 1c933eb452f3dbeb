//! crates/docdesk_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on.
//! These traits form the boundary of the hexagonal architecture: the session and
//! workspace logic never talk HTTP or touch the filesystem directly.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{Credentials, DocumentDetail, DocumentSummary};
use crate::token::BearerToken;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (HTTP, storage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The server-supplied human-readable detail, when the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            PortError::NotFound(detail) | PortError::Rejected { detail, .. }
                if !detail.is_empty() =>
            {
                Some(detail)
            }
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The unauthenticated half of the remote API.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account. Does not log in.
    async fn register(&self, credentials: &Credentials) -> PortResult<()>;

    /// Exchanges a username and password for a bearer token.
    async fn obtain_token(&self, credentials: &Credentials) -> PortResult<BearerToken>;

    /// Checks that a stored token is still accepted by the API.
    async fn verify_token(&self, token: &BearerToken) -> PortResult<()>;
}

/// The authenticated document endpoints of the remote API.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list_documents(&self, token: &BearerToken) -> PortResult<Vec<DocumentSummary>>;

    async fn upload_document(
        &self,
        token: &BearerToken,
        filename: &str,
        content: Bytes,
    ) -> PortResult<()>;

    async fn fetch_document(&self, token: &BearerToken, id: &str) -> PortResult<DocumentDetail>;
}

/// Durable client-side storage for the bearer credential.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> PortResult<Option<BearerToken>>;

    async fn save(&self, token: &BearerToken) -> PortResult<()>;

    /// Removing an absent token is not an error.
    async fn clear(&self) -> PortResult<()>;
}
