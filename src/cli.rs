//! Command-line interface for remote_tictactoe.

use clap::{Args, Parser, Subcommand};
use remote_tictactoe::{ClientConfig, ConfigError, ConfigOverrides, ENDPOINT_ENV};
use std::path::PathBuf;
use tictactoe_session::{Difficulty, Mark};
use tracing::instrument;

/// Remote Tic-Tac-Toe - play against a move service over HTTP
#[derive(Parser, Debug)]
#[command(name = "remote_tictactoe")]
#[command(about = "Play tic-tac-toe against a remote move service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Configuration sources
        #[command(flatten)]
        settings: SettingsArgs,

        /// File to write logs to (keeps the board readable)
        #[arg(long, default_value = "remote_tictactoe.log")]
        log_file: PathBuf,
    },

    /// Print the effective configuration as TOML
    ShowConfig {
        /// Configuration sources
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Flags shared by every command that needs a configuration.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Move endpoint URL (overrides config and TICTACTOE_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Starting difficulty (easy, medium, hard)
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Symbol the human plays (X or O)
    #[arg(long)]
    pub human_symbol: Option<Mark>,

    /// Per-move timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl SettingsArgs {
    /// Layers defaults, config file, environment and flags.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<ClientConfig, ConfigError> {
        let flags = ConfigOverrides {
            endpoint: self.endpoint.clone(),
            difficulty: self.difficulty,
            human_symbol: self.human_symbol,
            timeout_ms: self.timeout_ms,
        };
        ClientConfig::layered(
            self.config.as_deref(),
            std::env::var(ENDPOINT_ENV).ok(),
            &flags,
        )
    }
}
