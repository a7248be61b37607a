//! Session state and the adapter-facing command/event vocabulary.

use crate::board::Board;
use crate::types::{
    CellValue, Coord, Difficulty, EndReason, GamePhase, RequestEpoch, SymbolAssignment,
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Complete mutable game state for one player.
///
/// Created once per game and mutated only by the session controller. A
/// reset reuses the same value.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    /// Cell marks.
    board: Board,
    /// State machine position.
    phase: GamePhase,
    /// Strength forwarded with the next request.
    difficulty: Difficulty,
    /// Generation counter, bumped on reset.
    epoch: RequestEpoch,
    /// Player-to-symbol mapping, fixed for the session's lifetime.
    assignment: SymbolAssignment,
}

impl Session {
    /// Creates a session with an empty board in the `Active` phase.
    #[instrument]
    pub fn new(assignment: SymbolAssignment, difficulty: Difficulty) -> Self {
        info!(
            human = %assignment.human(),
            computer = %assignment.computer(),
            %difficulty,
            "Creating session"
        );
        Self {
            board: Board::new(),
            phase: GamePhase::Active,
            difficulty,
            epoch: RequestEpoch::default(),
            assignment,
        }
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub(crate) fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Clears the board, returns to `Active` and advances the epoch.
    pub(crate) fn reset(&mut self) {
        self.board.clear();
        self.phase = GamePhase::Active;
        self.epoch = self.epoch.next();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SymbolAssignment::default(), Difficulty::default())
    }
}

/// Input from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// The human picked a cell.
    ClickCell(Coord),
    /// Change the strength for subsequent requests.
    SetDifficulty(Difficulty),
    /// Start over with an empty board.
    Reset,
}

/// Output to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A cell changed.
    CellUpdated {
        /// Which cell.
        coord: Coord,
        /// Its new contents.
        value: CellValue,
    },
    /// The state machine moved.
    PhaseChanged(GamePhase),
    /// True exactly while a request is outstanding.
    LoadingChanged(bool),
    /// The game is over.
    GameEnded {
        /// Why.
        reason: EndReason,
        /// What to tell the player.
        message: String,
    },
}
