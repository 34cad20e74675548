//! services/lexicon/src/bin/lexicon.rs

use clap::Parser;
use lexicon_lib::{
    cli::{self, Cli},
    config::Config,
    error::ApiError,
    init_tracing,
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Parse the Command Line ---
    let cli = Cli::parse();

    // --- 2. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    init_tracing(&config);
    info!(command = ?cli.command, "Configuration loaded.");

    // --- 3. Build the Shared AppState ---
    let state = AppState::connect(&config).await?;

    // --- 4. Stop a running job on Ctrl-C ---
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current word...");
            on_signal.cancel();
        }
    });

    // --- 5. Run the Command ---
    cli::run(cli.command, &state, &cancel).await
}
