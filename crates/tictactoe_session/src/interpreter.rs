//! Classification of move outcomes into session transitions.
//!
//! Pure: reads the session, never mutates it. The controller applies what
//! comes out of here.

use crate::outcome::{MoveError, MoveOutcome, MoveReply};
use crate::session::Session;
use crate::types::{Coord, EndReason, GamePhase, SymbolAssignment};
use crate::wire::GameStatus;
use tracing::{debug, instrument, warn};

/// What the controller should do with a delivered outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    /// Apply the computer's move, if any, and hand the turn back.
    Resume {
        /// Cell the service played.
        computer_move: Option<Coord>,
    },
    /// Apply the computer's move, if any, and end the game.
    End {
        /// Cell the service played.
        computer_move: Option<Coord>,
        /// Why the game ended.
        reason: EndReason,
        /// What to tell the player.
        message: String,
    },
}

impl SessionTransition {
    fn errored(error: &MoveError) -> Self {
        SessionTransition::End {
            computer_move: None,
            reason: EndReason::Errored,
            message: error.user_message(),
        }
    }
}

/// Maps a terminal game status to an end reason for this symbol assignment.
///
/// Returns `None` for [`GameStatus::Ongoing`].
pub fn end_reason(status: GameStatus, assignment: &SymbolAssignment) -> Option<EndReason> {
    match status {
        GameStatus::Ongoing => None,
        GameStatus::Draw => Some(EndReason::Draw),
        GameStatus::WinX | GameStatus::WinO => {
            if status.winner() == Some(assignment.human()) {
                Some(EndReason::WonByHuman)
            } else {
                Some(EndReason::WonByComputer)
            }
        }
    }
}

/// Decides the transition for `outcome` given the current session.
///
/// Returns `None` when the outcome must be dropped: it belongs to an epoch
/// superseded by a reset, or no request is outstanding.
#[instrument(skip(outcome, session), fields(outcome_epoch = %outcome.epoch(), session_epoch = %session.epoch()))]
pub fn interpret(outcome: &MoveOutcome, session: &Session) -> Option<SessionTransition> {
    if outcome.epoch() != session.epoch() {
        debug!("Discarding response from a previous epoch");
        return None;
    }
    if *session.phase() != GamePhase::WaitingForRemote {
        warn!(phase = %session.phase(), "Discarding response with no request outstanding");
        return None;
    }

    let transition = match outcome.result() {
        Err(error) => {
            warn!(%error, "Move exchange failed");
            SessionTransition::errored(error)
        }
        Ok(reply) => interpret_reply(reply, session),
    };
    debug!(?transition, "Interpreted outcome");
    Some(transition)
}

/// An occupied target is fatal while the game goes on. Once the service
/// reports a result, the move is dropped and the result stands.
fn interpret_reply(reply: &MoveReply, session: &Session) -> SessionTransition {
    let reason = end_reason(*reply.status(), session.assignment());
    let mut computer_move = *reply.computer_move();

    if let Some(coord) = computer_move.filter(|c| !session.board().is_empty(*c)) {
        if reason.is_none() {
            warn!(%coord, "Service played on an occupied cell");
            return SessionTransition::errored(&MoveError::protocol(format!(
                "Computer move {} targets an occupied cell",
                coord
            )));
        }
        warn!(%coord, status = ?reply.status(), "Ignoring final move onto an occupied cell");
        computer_move = None;
    }

    match reason {
        None => SessionTransition::Resume { computer_move },
        Some(reason) => SessionTransition::End {
            computer_move,
            reason,
            message: reason.message().to_string(),
        },
    }
}
