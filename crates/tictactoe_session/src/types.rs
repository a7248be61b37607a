//! Core domain types for a human-vs-remote tic-tac-toe session.

use crate::board::BoardError;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};
use tracing::instrument;

/// User-facing message for any failure that is not a structured server error.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try resetting the game.";

/// Symbol placed on the board as seen on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Mark {
    /// The `"X"` symbol.
    X,
    /// The `"O"` symbol.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Contents of a single board cell, relative to the session's players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Marked by the local human player.
    Human,
    /// Marked by the remote move service.
    Computer,
}

/// Fixed mapping between players and wire symbols for one session.
///
/// The computer always plays the opponent of the human's mark, so the two
/// sides can never share a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolAssignment {
    human: Mark,
}

impl SymbolAssignment {
    /// Creates an assignment where the human plays `human`.
    pub fn with_human(human: Mark) -> Self {
        Self { human }
    }

    /// The human player's mark.
    pub fn human(&self) -> Mark {
        self.human
    }

    /// The remote service's mark.
    pub fn computer(&self) -> Mark {
        self.human.opponent()
    }

    /// Wire symbol for a cell, `None` for empty cells.
    pub fn mark_for(&self, value: CellValue) -> Option<Mark> {
        match value {
            CellValue::Empty => None,
            CellValue::Human => Some(self.human()),
            CellValue::Computer => Some(self.computer()),
        }
    }

    /// Cell value for a wire symbol.
    pub fn value_for(&self, mark: Option<Mark>) -> CellValue {
        match mark {
            None => CellValue::Empty,
            Some(mark) if mark == self.human => CellValue::Human,
            Some(_) => CellValue::Computer,
        }
    }
}

impl Default for SymbolAssignment {
    fn default() -> Self {
        Self::with_human(Mark::O)
    }
}

/// A validated cell coordinate on the 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("({row}, {col})")]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// Number of rows (and columns) on the board.
    pub const SIZE: usize = 3;

    /// Creates a coordinate, rejecting anything outside `0..=2`.
    #[instrument]
    pub fn new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row >= Self::SIZE || col >= Self::SIZE {
            return Err(BoardError::InvalidCoordinate {
                row: row as i64,
                col: col as i64,
            });
        }
        Ok(Self { row, col })
    }

    /// Creates a coordinate from signed wire values.
    #[instrument]
    pub fn from_wire(row: i64, col: i64) -> Result<Self, BoardError> {
        let in_range = |v: i64| (0..Self::SIZE as i64).contains(&v);
        if !in_range(row) || !in_range(col) {
            return Err(BoardError::InvalidCoordinate { row, col });
        }
        Ok(Self {
            row: row as usize,
            col: col as usize,
        })
    }

    /// Creates a coordinate from a cell number `1..=9`, counted row by row.
    #[instrument]
    pub fn from_linear(position: usize) -> Result<Self, BoardError> {
        if !(1..=Self::SIZE * Self::SIZE).contains(&position) {
            return Err(BoardError::InvalidCellNumber(position));
        }
        let index = position - 1;
        Self::new(index / Self::SIZE, index % Self::SIZE)
    }

    /// Row index.
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(self) -> usize {
        self.col
    }

    /// All nine coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..Self::SIZE).flat_map(|row| (0..Self::SIZE).map(move |col| Coord { row, col }))
    }
}

/// Strength requested from the remote service. Opaque to the session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    strum::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    /// Random moves.
    #[default]
    Easy,
    /// Learned moves.
    Medium,
    /// Perfect play.
    Hard,
}

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum EndReason {
    /// The human completed a line.
    WonByHuman,
    /// The remote service completed a line.
    WonByComputer,
    /// The board filled up without a winner.
    Draw,
    /// The move exchange failed.
    Errored,
}

impl EndReason {
    /// Message shown to the player when the game ends this way.
    ///
    /// `Errored` games carry their own message; this returns the generic one.
    pub fn message(self) -> &'static str {
        match self {
            EndReason::WonByHuman => "You Won!",
            EndReason::WonByComputer => "You lost!",
            EndReason::Draw => "It's a draw!",
            EndReason::Errored => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// Position of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GamePhase {
    /// Waiting for the human to click a cell.
    Active,
    /// A move request is outstanding.
    WaitingForRemote,
    /// The game is over until the next reset.
    #[display("Ended({_0})")]
    Ended(EndReason),
}

/// Generation counter bumped on every reset.
///
/// Responses tagged with an older epoch belong to a board the player has
/// already thrown away.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct RequestEpoch(u64);

impl RequestEpoch {
    /// Wraps a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The following epoch.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}
