//! services/client/src/cli/commands.rs
//!
//! One-shot commands and the text rendering shared with the dashboard.

use bytes::Bytes;
use docdesk_core::{DocumentDetail, DocumentSummary, WorkspaceView};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::args::Commands;
use crate::cli::state::AppState;
use crate::error::ClientError;

pub const NO_DOCUMENTS: &str = "No PDFs available";

//=========================================================================================
// Rendering
//=========================================================================================

pub fn render_listing(documents: &[DocumentSummary]) -> String {
    if documents.is_empty() {
        return NO_DOCUMENTS.to_string();
    }
    let width = documents.iter().map(|doc| doc.id.len()).max().unwrap_or(0);
    documents
        .iter()
        .map(|doc| format!("{:<width$}  {}", doc.id, doc.filename, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_view(view: &WorkspaceView) -> String {
    match view {
        WorkspaceView::Unauthenticated => "Not logged in".to_string(),
        WorkspaceView::NoSelection { documents } => format!(
            "Your Documents\n{}\n\nSelect a PDF to view",
            render_listing(documents)
        ),
        WorkspaceView::Selected {
            documents,
            document,
        } => format!(
            "Your Documents\n{}\n\nViewing: {} ({})",
            render_listing(documents),
            document.filename,
            document.id
        ),
    }
}

//=========================================================================================
// File Helpers
//=========================================================================================

/// The name a local file is uploaded under: its final path component.
pub fn upload_name(path: &Path) -> Result<String, ClientError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Internal(format!("'{}' is not a file path", path.display())))
}

fn last_component(raw: &str) -> Option<&str> {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

/// Where a viewed document is written when no path is given.
///
/// Only the last component of the server-supplied filename (or, failing that,
/// of the id) is used.
pub fn default_view_path(document: &DocumentDetail) -> PathBuf {
    let name = last_component(&document.filename)
        .map(str::to_string)
        .or_else(|| last_component(&document.id).map(|id| format!("{}.pdf", id)))
        .unwrap_or_else(|| "document.pdf".to_string());
    std::env::temp_dir().join("docdesk").join(name)
}

/// Decodes the document and writes the PDF bytes to disk.
pub async fn write_document(
    document: &DocumentDetail,
    out: Option<&Path>,
) -> Result<PathBuf, ClientError> {
    let bytes = document.decode_content().map_err(|e| {
        ClientError::Internal(format!("'{}' has malformed content: {}", document.filename, e))
    })?;
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_view_path(document));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Document written");
    Ok(path)
}

pub fn prompt_password(given: Option<String>) -> Result<String, ClientError> {
    match given {
        Some(password) => Ok(password),
        None => Ok(inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()?),
    }
}

//=========================================================================================
// Command Dispatch
//=========================================================================================

/// Runs one non-interactive command, writing its output to `out`.
pub async fn run(
    command: Commands,
    state: &AppState,
    out: &mut impl Write,
) -> Result<(), ClientError> {
    match command {
        Commands::Register { username, password } => {
            let password = prompt_password(password)?;
            state.session.register(&username, &password).await?;
            writeln!(out, "Registered {}. Log in with `docdesk login -u {}`.", username, username)?;
        }
        Commands::Login { username, password } => {
            let password = prompt_password(password)?;
            let identity = state.session.login(&username, &password).await?;
            writeln!(out, "Welcome, {}", identity)?;
        }
        Commands::Logout => {
            state.workspace.logout().await;
            writeln!(out, "Logged out")?;
        }
        Commands::Whoami => match state.session.current_identity() {
            Some(identity) => writeln!(out, "{}", identity)?,
            None => writeln!(out, "Not logged in")?,
        },
        Commands::List => {
            let documents = state.workspace.list_documents().await?;
            writeln!(out, "{}", render_listing(&documents))?;
        }
        Commands::Upload { file } => {
            let filename = upload_name(&file)?;
            let content = tokio::fs::read(&file).await?;
            let documents = state
                .workspace
                .upload_document(Bytes::from(content), &filename)
                .await?;
            writeln!(out, "Uploaded {}\n{}", filename, render_listing(&documents))?;
        }
        Commands::View { id, out: target } => {
            let document = state
                .workspace
                .view_document(&id)
                .await
                .map_err(ClientError::View)?;
            let path = write_document(&document, target.as_deref()).await?;
            writeln!(out, "{} written to {}", document.filename, path.display())?;
        }
        Commands::Dashboard => {
            return Err(ClientError::Internal(
                "the dashboard is interactive; run it through `dashboard::run`".to_string(),
            ));
        }
    }
    Ok(())
}
