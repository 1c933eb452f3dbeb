//! services/client/src/cli/dashboard.rs
//!
//! The interactive dashboard: the login and register screens while logged out,
//! then the document list with upload, view and logout actions.
//!
//! Every failed action is reported immediately and the loop carries on; the
//! user retries by picking the action again.

use bytes::Bytes;
use docdesk_core::{DocumentSummary, WorkspaceView};
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::path::PathBuf;
use tracing::error;

use crate::cli::commands::{prompt_password, render_view, upload_name, write_document};
use crate::cli::state::AppState;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthChoice {
    Login,
    Register,
    Quit,
}

impl fmt::Display for AuthChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthChoice::Login => "Login",
            AuthChoice::Register => "Register",
            AuthChoice::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Upload,
    View,
    Refresh,
    Logout,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Upload => "Upload new PDF",
            Action::View => "View a document",
            Action::Refresh => "Refresh list",
            Action::Logout => "Logout",
            Action::Quit => "Quit",
        })
    }
}

/// A listing entry as shown in the document picker.
struct Pick(DocumentSummary);

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.filename, self.0.id)
    }
}

enum Step {
    Continue,
    Quit,
}

/// Shows a failed action to the user.
fn notify(error: &ClientError) {
    error!("{}", error);
    eprintln!("\n!! {}\n", error);
}

fn is_cancel(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Prompt(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

/// Runs the dashboard until the user quits.
pub async fn run(state: &AppState) -> Result<(), ClientError> {
    loop {
        let step = match state.workspace.view() {
            WorkspaceView::Unauthenticated => auth_screen(state).await,
            _ => document_screen(state).await,
        };

        match step {
            Ok(Step::Continue) => {}
            Ok(Step::Quit) => break,
            Err(e) if is_cancel(&e) => break,
            Err(e) => notify(&e),
        }
    }

    state.workspace.unmount();
    Ok(())
}

async fn auth_screen(state: &AppState) -> Result<Step, ClientError> {
    let choice = Select::new(
        "Not logged in.",
        vec![AuthChoice::Login, AuthChoice::Register, AuthChoice::Quit],
    )
    .prompt()?;

    match choice {
        AuthChoice::Quit => return Ok(Step::Quit),
        AuthChoice::Register => {
            let username = Text::new("Username:").prompt()?;
            let password = prompt_password(None)?;
            state.session.register(&username, &password).await?;
            println!("Registered {}. Please log in.", username);
        }
        AuthChoice::Login => {
            let username = Text::new("Username:").prompt()?;
            let password = prompt_password(None)?;
            let identity = state.session.login(&username, &password).await?;
            println!("\nWelcome, {}\n", identity);
            state.workspace.list_documents().await?;
        }
    }
    Ok(Step::Continue)
}

async fn document_screen(state: &AppState) -> Result<Step, ClientError> {
    let view = state.workspace.view();
    println!("{}\n", render_view(&view));

    let action = Select::new(
        "What next?",
        vec![
            Action::Upload,
            Action::View,
            Action::Refresh,
            Action::Logout,
            Action::Quit,
        ],
    )
    .prompt()?;

    match action {
        Action::Upload => {
            let raw = Text::new("Path of the PDF to upload:").prompt()?;
            let path = PathBuf::from(raw.trim());
            let filename = upload_name(&path)?;
            let content = tokio::fs::read(&path).await?;
            state
                .workspace
                .upload_document(Bytes::from(content), &filename)
                .await?;
            println!("Uploaded {}", filename);
        }
        Action::View => {
            let documents = match view {
                WorkspaceView::NoSelection { documents }
                | WorkspaceView::Selected { documents, .. } => documents,
                WorkspaceView::Unauthenticated => Vec::new(),
            };
            if documents.is_empty() {
                println!("Nothing to view yet. Upload a PDF first.");
                return Ok(Step::Continue);
            }

            let picks = documents.into_iter().map(Pick).collect();
            let Pick(summary) = Select::new("Select a PDF to view", picks).prompt()?;
            let document = state
                .workspace
                .view_document(&summary.id)
                .await
                .map_err(ClientError::View)?;
            let path = write_document(&document, None).await?;
            println!("Opened {} at {}", document.filename, path.display());
        }
        Action::Refresh => {
            state.workspace.list_documents().await?;
        }
        Action::Logout => {
            state.workspace.logout().await;
            println!("Logged out");
        }
        Action::Quit => return Ok(Step::Quit),
    }
    Ok(Step::Continue)
}
