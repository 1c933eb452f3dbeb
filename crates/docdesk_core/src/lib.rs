pub mod domain;
pub mod error;
pub mod ports;
pub mod session;
pub mod store;
pub mod token;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{Credentials, DocumentDetail, DocumentSummary, Identity};
pub use error::{AuthError, FetchError, UploadError};
pub use ports::{AuthService, DocumentService, PortError, PortResult, TokenStore};
pub use session::{SessionManager, SessionSnapshot};
pub use store::MemoryTokenStore;
pub use token::{BearerToken, TokenClaims};
pub use workspace::{Workspace, WorkspaceView};
