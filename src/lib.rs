//! Remote tic-tac-toe - play against a move service over HTTP
//!
//! The game state machine lives in [`tictactoe_session`]; this crate joins it
//! to the network and the terminal.
//!
//! # Architecture
//!
//! - **Client**: posts the board to the move service with a 2000 ms timeout
//! - **Driver**: runs the session controller, one request in flight at most
//! - **Config**: endpoint, timeout, symbols and difficulty from TOML/env/flags
//! - **Terminal**: a line-oriented front end
//!
//! # Example
//!
//! ```no_run
//! use remote_tictactoe::{ClientConfig, SessionHandle};
//! use std::sync::Arc;
//! use tictactoe_session::{Command, Coord};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let mut session = SessionHandle::spawn(config.controller(), Arc::new(config.move_client()));
//!
//! session.send(Command::ClickCell(Coord::new(1, 1)?)).await?;
//! while let Some(event) = session.next_event().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod driver;
mod terminal;

// Crate-level exports - Move client
pub use client::{DEFAULT_TIMEOUT, HttpMoveClient, MoveService};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, ConfigOverrides, ENDPOINT_ENV};

// Crate-level exports - Session driver
pub use driver::{DriverError, SessionDriver, SessionHandle};

// Crate-level exports - Terminal front end
pub use terminal::{HELP, InputError, TerminalInput, TerminalView, parse_input, run_terminal};
