//! Session state machine for tic-tac-toe against a remote move service.
//!
//! The human plays by clicking cells; each click is answered by a remote
//! service that picks the computer's move and reports whether the game is
//! over. This crate holds everything about that exchange that does not need
//! a network or a screen:
//!
//! - **Board**: the 3x3 grid, where marks are never overwritten
//! - **Wire**: JSON request/response payloads and their decoding
//! - **Interpreter**: pure classification of a move outcome
//! - **Controller**: the `Active` / `WaitingForRemote` / `Ended` state machine
//!
//! # Example
//!
//! ```
//! use tictactoe_session::{
//!     Command, Coord, Difficulty, GamePhase, GameStatus, MoveOutcome, MoveReply,
//!     SessionController, SymbolAssignment,
//! };
//!
//! let mut controller = SessionController::new(SymbolAssignment::default(), Difficulty::Easy);
//! let dispatch = controller.dispatch(Command::ClickCell(Coord::new(0, 0).unwrap()));
//! let pending = dispatch.request.expect("click on an empty cell sends a request");
//! assert_eq!(controller.phase(), GamePhase::WaitingForRemote);
//!
//! let reply = MoveReply::new(GameStatus::Ongoing, Some(Coord::new(1, 1).unwrap()), None);
//! controller.deliver(MoveOutcome::success(*pending.epoch(), reply));
//! assert_eq!(controller.phase(), GamePhase::Active);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod controller;
mod interpreter;
mod outcome;
mod session;
mod types;
mod wire;

pub use board::{Board, BoardError};
pub use controller::{Dispatch, PendingMove, SessionController};
pub use interpreter::{SessionTransition, end_reason, interpret};
pub use outcome::{MoveError, MoveOutcome, MoveReply};
pub use session::{Command, Event, Session};
pub use types::{
    CellValue, Coord, Difficulty, EndReason, GENERIC_ERROR_MESSAGE, GamePhase, Mark,
    RequestEpoch, SymbolAssignment,
};
pub use wire::{
    ErrorResponse, GameStatus, MoveRequest, MoveResponse, SENTINEL_MOVE, WireBoard,
    decode_failure, decode_success, render_grid,
};
