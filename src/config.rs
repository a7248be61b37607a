//! Client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML
//! file, the `TICTACTOE_ENDPOINT` environment variable (a `.env` file is
//! honored by the binary), and command-line flags.

use crate::client::HttpMoveClient;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tictactoe_session::{Difficulty, Mark, SessionController, SymbolAssignment};
use tracing::{debug, info, instrument};

/// Environment variable overriding the move endpoint.
pub const ENDPOINT_ENV: &str = "TICTACTOE_ENDPOINT";

/// Configuration for a game against the remote move service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the move endpoint.
    #[serde(default = "default_endpoint")]
    endpoint: String,

    /// Client-side timeout per move, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// Symbol the human plays; the service gets the other one.
    #[serde(default = "default_human_symbol")]
    human_symbol: Mark,

    /// Starting difficulty.
    #[serde(default)]
    difficulty: Difficulty,
}

#[instrument]
fn default_endpoint() -> String {
    "http://127.0.0.1:5000/api/get_computer_move".to_string()
}

#[instrument]
fn default_timeout_ms() -> u64 {
    2000
}

#[instrument]
fn default_human_symbol() -> Mark {
    Mark::O
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            human_symbol: default_human_symbol(),
            difficulty: Difficulty::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(endpoint = %config.endpoint, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the effective configuration.
    ///
    /// Later sources win: defaults, the file at `path`, `env_endpoint`,
    /// then `flags`. The result is validated.
    #[instrument(skip(path, flags))]
    pub fn layered(
        path: Option<&Path>,
        env_endpoint: Option<String>,
        flags: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = flags.apply(base.with_endpoint_override(env_endpoint));
        config.validate()?;
        Ok(config)
    }

    /// Replaces the endpoint unless `endpoint` is absent or blank.
    #[instrument(skip(self))]
    pub fn with_endpoint_override(self, endpoint: Option<String>) -> Self {
        match endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                debug!(%endpoint, "Endpoint overridden");
                self.with_endpoint(endpoint.trim())
            }
            _ => self,
        }
    }

    /// Replaces the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replaces the timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Replaces the human's symbol.
    pub fn with_human_symbol(mut self, human_symbol: Mark) -> Self {
        self.human_symbol = human_symbol;
        self
    }

    /// Replaces the starting difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Checks values that serde cannot.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::new(format!(
                "Endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::new("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Symbol assignment for new sessions.
    pub fn assignment(&self) -> SymbolAssignment {
        SymbolAssignment::with_human(self.human_symbol)
    }

    /// Builds an HTTP move client from this configuration.
    pub fn move_client(&self) -> HttpMoveClient {
        HttpMoveClient::new(&self.endpoint).with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Builds a controller for a new session.
    pub fn controller(&self) -> SessionController {
        SessionController::new(self.assignment(), self.difficulty)
    }
}

/// Values given on the command line. `None` keeps the lower layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Move endpoint URL.
    pub endpoint: Option<String>,
    /// Starting difficulty.
    pub difficulty: Option<Difficulty>,
    /// Symbol the human plays.
    pub human_symbol: Option<Mark>,
    /// Per-move timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Applies every value that is set.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(difficulty) = self.difficulty {
            config = config.with_difficulty(difficulty);
        }
        if let Some(human_symbol) = self.human_symbol {
            config = config.with_human_symbol(human_symbol);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout_ms(timeout_ms);
        }
        config
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
