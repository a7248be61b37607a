//! Remote Tic-Tac-Toe - terminal client
//!
//! Plays against a move service reached over HTTP.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use remote_tictactoe::{ClientConfig, run_terminal};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { settings, log_file } => run_play(settings.resolve()?, log_file).await,
        Command::ShowConfig { settings } => show_config(settings.resolve()?),
    }
}

/// Play a game in the terminal
async fn run_play(config: ClientConfig, log_file: PathBuf) -> Result<()> {
    // Log to a file so tracing output does not interleave with the board
    let log_file = std::fs::File::create(&log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!(endpoint = %config.endpoint(), "Starting Remote Tic-Tac-Toe");
    run_terminal(config).await
}

/// Print the effective configuration
fn show_config(config: ClientConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
