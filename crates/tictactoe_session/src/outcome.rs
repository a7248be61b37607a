//! Results of a single move exchange.

use crate::types::{Coord, GENERIC_ERROR_MESSAGE, RequestEpoch};
use crate::wire::{GameStatus, WireBoard};
use derive_getters::Getters;
use tracing::instrument;

/// Why a move exchange failed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Timeout or transport failure before any response arrived.
    #[display("Network error: {detail}")]
    Network {
        /// Transport-level description.
        detail: String,
    },

    /// The service answered with its structured error shape.
    #[display("Remote error: {message}")]
    Remote {
        /// Server message, shown to the player verbatim.
        message: String,
    },

    /// The response could not be understood.
    #[display("Protocol error: {detail}")]
    Protocol {
        /// What was wrong with the payload.
        detail: String,
    },
}

impl std::error::Error for MoveError {}

impl MoveError {
    /// Creates a network error.
    #[instrument(skip(detail))]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    /// Creates a remote error carrying the server's message.
    #[instrument(skip(message))]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[instrument(skip(detail))]
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
        }
    }

    /// Message to show the player.
    pub fn user_message(&self) -> String {
        match self {
            MoveError::Remote { message } => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// A decoded success response.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveReply {
    /// Status after the service's move.
    status: GameStatus,
    /// Where the service played; `None` for the sentinel or an absent move.
    computer_move: Option<Coord>,
    /// Board echoed by the service, if any.
    echoed_board: Option<WireBoard>,
}

impl MoveReply {
    /// Creates a reply.
    pub fn new(
        status: GameStatus,
        computer_move: Option<Coord>,
        echoed_board: Option<WireBoard>,
    ) -> Self {
        Self {
            status,
            computer_move,
            echoed_board,
        }
    }
}

/// Everything the move client hands back, tagged with the epoch the
/// request was issued in.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveOutcome {
    /// Session generation the request belongs to.
    epoch: RequestEpoch,
    /// Decoded reply or failure.
    result: Result<MoveReply, MoveError>,
}

impl MoveOutcome {
    /// Creates an outcome.
    pub fn new(epoch: RequestEpoch, result: Result<MoveReply, MoveError>) -> Self {
        Self { epoch, result }
    }

    /// Shorthand for a successful outcome.
    pub fn success(epoch: RequestEpoch, reply: MoveReply) -> Self {
        Self::new(epoch, Ok(reply))
    }

    /// Shorthand for a failed outcome.
    pub fn failure(epoch: RequestEpoch, error: MoveError) -> Self {
        Self::new(epoch, Err(error))
    }
}
