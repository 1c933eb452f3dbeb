//! services/client/src/cli/args.rs
//!
//! Command-line arguments for the `docdesk` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docdesk - upload, list and view your PDFs from the terminal.
#[derive(Debug, Parser)]
#[command(name = "docdesk")]
#[command(version)]
#[command(about = "Client for the docdesk PDF service")]
#[command(long_about = "docdesk - client for the docdesk PDF service\n\n\
    Create an account:   docdesk register -u alice\n\
    Log in:              docdesk login -u alice\n\
    List documents:      docdesk list\n\
    Upload a PDF:        docdesk upload report.pdf\n\
    Open a PDF:          docdesk view alice_0 -o report.pdf\n\
    Interactive mode:    docdesk dashboard")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the API (overrides DOCDESK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account. Does not log in.
    Register {
        #[arg(short, long)]
        username: String,
        /// Prompted for (hidden) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted for (hidden) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// List your documents
    List,

    /// Upload a PDF file
    Upload {
        /// Path of the file to upload
        file: PathBuf,
    },

    /// Download a document and write the PDF to disk
    View {
        /// Document id, as shown by `list`
        id: String,
        /// Where to write the PDF (defaults to the system temp directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Interactive dashboard: log in, upload, browse and open documents
    Dashboard,
}

impl Commands {
    /// Commands that start from a fresh login rather than a rehydrated session.
    pub fn skips_restore(&self) -> bool {
        matches!(
            self,
            Commands::Register { .. } | Commands::Login { .. } | Commands::Logout
        )
    }
}
