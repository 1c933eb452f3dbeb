//! services/client/src/bin/docdesk.rs

use clap::Parser;
use client_lib::{
    cli::{commands, dashboard, AppState, Cli, Commands},
    config::Config,
    error::ClientError,
};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            if e.needs_login() {
                eprintln!("Log in first with `docdesk login -u <username>`.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config = config.with_api_url(api_url)?;
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!(api_url = %config.api_url, token_path = %config.token_path.display(), "Configuration loaded");

    // --- 2. Build the Shared State ---
    let state = AppState::new(config)?;

    // --- 3. Rehydrate the Session ---
    if !cli.command.skips_restore() {
        state.restore_session().await;
    }

    // --- 4. Dispatch ---
    match cli.command {
        Commands::Dashboard => dashboard::run(&state).await,
        command => {
            let mut stdout = std::io::stdout().lock();
            commands::run(command, &state, &mut stdout).await
        }
    }
}
