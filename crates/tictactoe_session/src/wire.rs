//! JSON payloads exchanged with the remote move service.
//!
//! Request:
//!
//! ```json
//! { "board": [["O", null, null], [null, null, null], [null, null, null]],
//!   "computer_symbol": "X", "difficulty_level": "Easy" }
//! ```
//!
//! Success (2xx):
//!
//! ```json
//! { "success": true, "board": [[...]], "computer_move": [1, 1], "game_status": "ongoing" }
//! ```
//!
//! Error (non-2xx): `{ "success": false, "message": "..." }`.

use crate::outcome::{MoveError, MoveReply};
use crate::types::{Coord, Difficulty, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Board as sent over the wire: a symbol or `null` per cell.
pub type WireBoard = [[Option<Mark>; Coord::SIZE]; Coord::SIZE];

/// Coordinates meaning "no move to apply".
pub const SENTINEL_MOVE: [i64; 2] = [-1, -1];

/// Body of the POST sent for every human move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Current board, human move included.
    pub board: WireBoard,
    /// Symbol the service plays.
    pub computer_symbol: Mark,
    /// Requested strength.
    pub difficulty_level: Difficulty,
}

/// Formats a grid as three `|`-separated rows.
///
/// Marked cells show their symbol, empty cells their cell number `1..=9`.
pub fn render_grid(board: &WireBoard) -> String {
    let rows: Vec<String> = board
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, mark)| match mark {
                    Some(mark) => mark.to_string(),
                    None => (row * Coord::SIZE + col + 1).to_string(),
                })
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect();
    rows.join("\n-+-+-\n")
}

/// Game status reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Nobody has won and cells remain.
    #[serde(rename = "ongoing")]
    Ongoing,
    /// X completed a line.
    #[serde(rename = "win-X")]
    WinX,
    /// O completed a line.
    #[serde(rename = "win-O")]
    WinO,
    /// Board full, no winner.
    #[serde(rename = "draw")]
    Draw,
}

impl GameStatus {
    /// The winning mark, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            GameStatus::WinX => Some(Mark::X),
            GameStatus::WinO => Some(Mark::O),
            GameStatus::Ongoing | GameStatus::Draw => None,
        }
    }
}

/// Success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Always true on this shape.
    pub success: bool,
    /// Board after the service's move, if echoed.
    pub board: Option<WireBoard>,
    /// `[row, col]` of the service's move, `[-1, -1]` for none.
    pub computer_move: Option<[i64; 2]>,
    /// Status after the service's move.
    pub game_status: GameStatus,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false on this shape.
    pub success: bool,
    /// Human-readable explanation.
    pub message: String,
}

/// Decodes the body of a 2xx response.
///
/// A 2xx body that carries the error shape is reported as a remote error.
#[instrument(skip(body), fields(body_len = body.len()))]
pub fn decode_success(body: &str) -> Result<MoveReply, MoveError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, body = %body, "Success body is not JSON");
        MoveError::protocol(format!("Invalid JSON response: {}", e))
    })?;

    if value.get("success") == Some(&serde_json::Value::Bool(false)) {
        debug!("2xx response carries the error shape");
        return Err(decode_error_value(value));
    }

    let response: MoveResponse = serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, body = %body, "Success body has the wrong shape");
        MoveError::protocol(format!("Malformed move response: {}", e))
    })?;

    if !response.success {
        return Err(MoveError::protocol("Move response without success flag"));
    }

    let computer_move = match response.computer_move {
        None if response.game_status == GameStatus::Ongoing => {
            return Err(MoveError::protocol(
                "Ongoing game response is missing computer_move",
            ));
        }
        None => None,
        Some(SENTINEL_MOVE) => None,
        Some([row, col]) => Some(Coord::from_wire(row, col).map_err(|e| {
            warn!(row, col, "Computer move outside the board");
            MoveError::protocol(e.to_string())
        })?),
    };

    debug!(?computer_move, status = ?response.game_status, "Decoded move response");
    Ok(MoveReply::new(
        response.game_status,
        computer_move,
        response.board,
    ))
}

/// Decodes the body of a non-2xx response.
///
/// The structured error shape yields [`MoveError::Remote`]; anything else is
/// a protocol error.
#[instrument(skip(body), fields(body_len = body.len()))]
pub fn decode_failure(status: u16, body: &str) -> MoveError {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => decode_error_value(value),
        Err(e) => {
            warn!(status, error = %e, body = %body, "Error body is not JSON");
            MoveError::protocol(format!("HTTP {} with unreadable body: {}", status, e))
        }
    }
}

fn decode_error_value(value: serde_json::Value) -> MoveError {
    match serde_json::from_value::<ErrorResponse>(value) {
        Ok(error) if !error.success => MoveError::remote(error.message),
        Ok(_) => MoveError::protocol("Error response claims success"),
        Err(e) => MoveError::protocol(format!("Malformed error response: {}", e)),
    }
}
