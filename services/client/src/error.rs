//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use docdesk_core::{AuthError, FetchError, PortError, UploadError};

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Failed to fetch PDFs: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to view PDF: {0}")]
    View(FetchError),

    #[error("Failed to upload PDF: {0}")]
    Upload(#[from] UploadError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// An interactive prompt was cancelled or could not be shown.
    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    /// Represents a standard Input/Output error (e.g., reading the file to upload).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether the user has to log in before retrying.
    pub fn needs_login(&self) -> bool {
        match self {
            ClientError::Fetch(e) | ClientError::View(e) => e.is_login_required(),
            ClientError::Upload(e) => e.is_login_required(),
            _ => false,
        }
    }
}
