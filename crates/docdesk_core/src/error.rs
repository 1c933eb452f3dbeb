//! crates/docdesk_core/src/error.rs
//!
//! The error taxonomy surfaced to the user by the session and workspace.

use crate::ports::PortError;

/// Failures of login, registration and rehydration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Bad credentials or a registration conflict. Carries a human-readable message.
    #[error("{0}")]
    Rejected(String),

    /// The API could not be reached or answered with something unexpected.
    #[error("Authentication service unavailable: {0}")]
    Unavailable(PortError),

    /// The credential could not be read from or written to durable storage.
    #[error("Credential storage failed: {0}")]
    Storage(PortError),

    #[error("Another authentication request is already in progress")]
    Busy,

    /// The session was logged out while the request was in flight.
    #[error("The session changed while logging in; the result was discarded")]
    Discarded,
}

/// Failures of listing and viewing documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Not logged in")]
    LoginRequired,

    #[error("A request for this action is already in progress")]
    Busy,

    /// The session changed or the workspace was left while the request was in flight.
    #[error("The response arrived after the session changed and was discarded")]
    Discarded,

    #[error("{0}")]
    Api(#[from] PortError),
}

/// Failures of uploading a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Not logged in")]
    LoginRequired,

    #[error("An upload is already in progress")]
    Busy,

    #[error("The response arrived after the session changed and was discarded")]
    Discarded,

    #[error("{0}")]
    Api(#[from] PortError),

    /// The upload succeeded but the follow-up listing did not.
    #[error("Uploaded, but refreshing the document list failed: {0}")]
    Refresh(FetchError),
}

impl FetchError {
    pub fn is_login_required(&self) -> bool {
        matches!(self, FetchError::LoginRequired)
    }
}

impl UploadError {
    pub fn is_login_required(&self) -> bool {
        matches!(
            self,
            UploadError::LoginRequired | UploadError::Refresh(FetchError::LoginRequired)
        )
    }
}
