//! crates/docdesk_core/src/workspace.rs
//!
//! The document workspace: lists, uploads and views documents on behalf of the
//! current identity.
//!
//! Every operation first checks the session. With no identity it returns
//! `LoginRequired` without touching the network, and the front end routes to the
//! login entry point. Responses that arrive after the session changed, or after
//! the workspace was unmounted, are discarded instead of being applied.

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{DocumentDetail, DocumentSummary, Identity};
use crate::error::{FetchError, UploadError};
use crate::ports::{DocumentService, PortError, PortResult};
use crate::session::SessionManager;
use crate::token::BearerToken;

//=========================================================================================
// View State
//=========================================================================================

/// What the dashboard should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceView {
    Unauthenticated,
    /// An empty `documents` is the "no documents" state, not an error.
    NoSelection {
        documents: Vec<DocumentSummary>,
    },
    Selected {
        documents: Vec<DocumentSummary>,
        document: DocumentDetail,
    },
}

/// Listing and selection, tagged with the session generation they belong to.
#[derive(Debug, Default)]
struct Held {
    generation: u64,
    documents: Vec<DocumentSummary>,
    selected: Option<DocumentDetail>,
}

impl Held {
    fn adopt(&mut self, generation: u64) {
        if self.generation != generation {
            *self = Held {
                generation,
                ..Held::default()
            };
        }
    }
}

/// The session an in-flight request was issued under.
struct Ticket {
    generation: u64,
    identity: Identity,
    token: BearerToken,
}

/// Why an operation stopped before producing a result.
enum Interrupted {
    LoginRequired,
    Discarded,
    Api(PortError),
}

impl From<Interrupted> for FetchError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::LoginRequired => FetchError::LoginRequired,
            Interrupted::Discarded => FetchError::Discarded,
            Interrupted::Api(e) => FetchError::Api(e),
        }
    }
}

impl From<Interrupted> for UploadError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::LoginRequired => UploadError::LoginRequired,
            Interrupted::Discarded => UploadError::Discarded,
            Interrupted::Api(e) => UploadError::Api(e),
        }
    }
}

//=========================================================================================
// Workspace
//=========================================================================================

pub struct Workspace {
    session: Arc<SessionManager>,
    documents: Arc<dyn DocumentService>,
    held: watch::Sender<Held>,
    /// Cancelled once the workspace is navigated away from.
    mounted: CancellationToken,
    // One outstanding request per action.
    listing: Mutex<()>,
    uploading: Mutex<()>,
    viewing: Mutex<()>,
}

impl Workspace {
    pub fn new(session: Arc<SessionManager>, documents: Arc<dyn DocumentService>) -> Self {
        let (held, _) = watch::channel(Held::default());
        Self {
            session,
            documents,
            held,
            mounted: CancellationToken::new(),
            listing: Mutex::new(()),
            uploading: Mutex::new(()),
            viewing: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Snapshot of what should be on screen right now.
    pub fn view(&self) -> WorkspaceView {
        let snapshot = self.session.snapshot();
        if snapshot.identity.is_none() {
            return WorkspaceView::Unauthenticated;
        }

        let held = self.held.borrow();
        if held.generation != snapshot.generation {
            return WorkspaceView::NoSelection {
                documents: Vec::new(),
            };
        }
        match &held.selected {
            Some(document) => WorkspaceView::Selected {
                documents: held.documents.clone(),
                document: document.clone(),
            },
            None => WorkspaceView::NoSelection {
                documents: held.documents.clone(),
            },
        }
    }

    /// Fetches the listing for the current identity and holds it.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, FetchError> {
        let _slot = self.listing.try_lock().map_err(|_| FetchError::Busy)?;
        self.refresh().await
    }

    /// Uploads one file, then re-lists once the upload has resolved.
    ///
    /// Returns the refreshed listing. Nothing is validated client-side.
    pub async fn upload_document(
        &self,
        content: Bytes,
        filename: &str,
    ) -> Result<Vec<DocumentSummary>, UploadError> {
        let _slot = self.uploading.try_lock().map_err(|_| UploadError::Busy)?;
        let ticket = self.authorize().await?;

        info!(%filename, bytes = content.len(), user = %ticket.identity, "Uploading document");
        let result = self
            .documents
            .upload_document(&ticket.token, filename, content)
            .await;
        self.settle(&ticket, result).await?;
        info!(%filename, "Upload complete");

        // Waits for the listing slot rather than failing as busy.
        let _listing = self.listing.lock().await;
        self.refresh().await.map_err(UploadError::Refresh)
    }

    /// Fetches one document and makes it the selection.
    ///
    /// On failure the previous selection is left untouched.
    pub async fn view_document(&self, id: &str) -> Result<DocumentDetail, FetchError> {
        let _slot = self.viewing.try_lock().map_err(|_| FetchError::Busy)?;
        let ticket = self.authorize().await?;

        debug!(%id, "Fetching document");
        let result = self.documents.fetch_document(&ticket.token, id).await;
        let document = self.settle(&ticket, result).await?;

        self.held.send_modify(|held| {
            held.adopt(ticket.generation);
            held.selected = Some(document.clone());
        });
        Ok(document)
    }

    /// Logs out and drops the listing and selection.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.held.send_replace(Held::default());
    }

    /// Marks the workspace as navigated away from. In-flight requests are not
    /// aborted, but their responses are discarded.
    pub fn unmount(&self) {
        self.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    async fn refresh(&self) -> Result<Vec<DocumentSummary>, FetchError> {
        let ticket = self.authorize().await?;

        debug!(user = %ticket.identity, "Listing documents");
        let result = self.documents.list_documents(&ticket.token).await;
        let documents = self.settle(&ticket, result).await?;

        info!(count = documents.len(), "Document listing refreshed");
        self.held.send_modify(|held| {
            held.adopt(ticket.generation);
            held.documents = documents.clone();
        });
        Ok(documents)
    }

    async fn authorize(&self) -> Result<Ticket, Interrupted> {
        if !self.is_mounted() {
            return Err(Interrupted::Discarded);
        }

        let snapshot = self.session.snapshot();
        let Some(identity) = snapshot.identity else {
            debug!("No identity, routing to login");
            return Err(Interrupted::LoginRequired);
        };

        match self.session.credential().await {
            Ok(Some(token)) => Ok(Ticket {
                generation: snapshot.generation,
                identity,
                token,
            }),
            Ok(None) => {
                warn!(user = %identity, "Stored credential disappeared, logging out");
                self.logout().await;
                Err(Interrupted::LoginRequired)
            }
            Err(e) => Err(Interrupted::Api(e)),
        }
    }

    /// Applies the staleness and credential checks to a response.
    async fn settle<T>(&self, ticket: &Ticket, result: PortResult<T>) -> Result<T, Interrupted> {
        if !self.is_mounted() || self.session.snapshot().generation != ticket.generation {
            debug!(user = %ticket.identity, "Discarding a response from a previous session");
            return Err(Interrupted::Discarded);
        }

        match result {
            Ok(value) => Ok(value),
            Err(PortError::Unauthorized) => {
                warn!(user = %ticket.identity, "Credential rejected by the API, logging out");
                self.logout().await;
                Err(Interrupted::Api(PortError::Unauthorized))
            }
            Err(e) => Err(Interrupted::Api(e)),
        }
    }
}
