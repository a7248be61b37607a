//! The session state machine.
//!
//! ```text
//!   Active --ClickCell(empty)--> WaitingForRemote --ongoing--> Active
//!                                       |
//!                                       +--win/draw/error--> Ended(reason)
//!   any --Reset--> Active (epoch + 1)
//! ```
//!
//! The controller never touches the network. A click that needs the remote
//! service yields a [`PendingMove`]; whoever drives the controller sends it
//! and later [`delivers`](SessionController::deliver) the tagged outcome.

use crate::board::{Board, BoardError};
use crate::interpreter::{SessionTransition, interpret};
use crate::outcome::MoveOutcome;
use crate::session::{Command, Event, Session};
use crate::types::{
    CellValue, Coord, Difficulty, EndReason, GENERIC_ERROR_MESSAGE, GamePhase, RequestEpoch,
    SymbolAssignment,
};
use crate::wire::{MoveRequest, WireBoard};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// A move request ready to be sent, tagged with its epoch.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PendingMove {
    /// Session generation at the time of the click.
    epoch: RequestEpoch,
    /// Payload for the remote service.
    request: MoveRequest,
}

impl PendingMove {
    /// Creates a pending move.
    pub fn new(epoch: RequestEpoch, request: MoveRequest) -> Self {
        Self { epoch, request }
    }
}

/// Result of handling one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Events for the presentation layer, in order.
    pub events: Vec<Event>,
    /// Request to send, if the command started one.
    pub request: Option<PendingMove>,
}

/// Drives one [`Session`] in response to commands and move outcomes.
///
/// At most one request is ever outstanding: requests are only issued from
/// `Active`, and the phase stays `WaitingForRemote` until the outcome for
/// that request is delivered or a reset abandons it.
#[derive(Debug, Clone, Default)]
pub struct SessionController {
    session: Session,
}

impl SessionController {
    /// Creates a controller around a fresh session.
    pub fn new(assignment: SymbolAssignment, difficulty: Difficulty) -> Self {
        Self {
            session: Session::new(assignment, difficulty),
        }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        *self.session.phase()
    }

    /// True exactly while a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase() == GamePhase::WaitingForRemote
    }

    /// Current epoch.
    pub fn epoch(&self) -> RequestEpoch {
        *self.session.epoch()
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        self.session.board()
    }

    /// Difficulty the next request will carry.
    pub fn difficulty(&self) -> Difficulty {
        *self.session.difficulty()
    }

    /// Symbols used by this session.
    pub fn assignment(&self) -> SymbolAssignment {
        *self.session.assignment()
    }

    /// Handles a command from the presentation layer.
    ///
    /// Commands that do not apply in the current phase are ignored.
    #[instrument(skip(self), fields(phase = %self.session.phase(), epoch = %self.session.epoch()))]
    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        match command {
            Command::ClickCell(coord) => self.click(coord),
            Command::SetDifficulty(difficulty) => {
                info!(%difficulty, "Difficulty changed");
                self.session.set_difficulty(difficulty);
                Dispatch::default()
            }
            Command::Reset => Dispatch {
                events: self.reset(),
                request: None,
            },
        }
    }

    /// Applies a move outcome delivered by the move client.
    ///
    /// Stale outcomes produce no events.
    #[instrument(skip(self, outcome), fields(epoch = %outcome.epoch()))]
    pub fn deliver(&mut self, outcome: MoveOutcome) -> Vec<Event> {
        let Some(transition) = interpret(&outcome, &self.session) else {
            return Vec::new();
        };

        let echoed = outcome
            .result()
            .as_ref()
            .ok()
            .and_then(|reply| *reply.echoed_board());

        let (computer_move, ending) = match transition {
            SessionTransition::Resume { computer_move } => (computer_move, None),
            SessionTransition::End {
                computer_move,
                reason,
                message,
            } => (computer_move, Some((reason, message))),
        };

        let mut events = Vec::new();
        // Unreachable while interpret() screens occupied targets.
        if let Err(e) = self.place_computer_move(computer_move, &mut events) {
            warn!(error = %e, "Could not apply computer move");
            self.end(EndReason::Errored, GENERIC_ERROR_MESSAGE.to_string(), &mut events);
            return events;
        }

        match ending {
            None => {
                self.check_echo(echoed);
                self.transition(GamePhase::Active, &mut events);
            }
            Some((reason, message)) => {
                if reason != EndReason::Errored {
                    self.check_echo(echoed);
                }
                self.end(reason, message, &mut events);
            }
        }
        events
    }

    // ─────────────────────────────────────────────────────────────
    //  Commands
    // ─────────────────────────────────────────────────────────────

    fn click(&mut self, coord: Coord) -> Dispatch {
        if self.phase() != GamePhase::Active {
            debug!(%coord, "Ignoring click outside the Active phase");
            return Dispatch::default();
        }
        if let Err(e) = self.session.board_mut().set(coord, CellValue::Human) {
            debug!(error = %e, "Ignoring click on occupied cell");
            return Dispatch::default();
        }

        let mut events = vec![Event::CellUpdated {
            coord,
            value: CellValue::Human,
        }];
        let request = PendingMove::new(self.epoch(), self.build_request());
        info!(%coord, epoch = %self.epoch(), "Human moved, requesting computer move");
        self.transition(GamePhase::WaitingForRemote, &mut events);

        Dispatch {
            events,
            request: Some(request),
        }
    }

    fn reset(&mut self) -> Vec<Event> {
        let cleared = self.session.board().occupied();
        let was = self.phase();
        self.session.reset();
        info!(epoch = %self.epoch(), "Session reset");

        let mut events: Vec<Event> = cleared
            .into_iter()
            .map(|coord| Event::CellUpdated {
                coord,
                value: CellValue::Empty,
            })
            .collect();
        if was == GamePhase::WaitingForRemote {
            events.push(Event::LoadingChanged(false));
        }
        if was != GamePhase::Active {
            events.push(Event::PhaseChanged(GamePhase::Active));
        }
        events
    }

    // ─────────────────────────────────────────────────────────────
    //  Helpers
    // ─────────────────────────────────────────────────────────────

    fn build_request(&self) -> MoveRequest {
        let assignment = self.session.assignment();
        MoveRequest {
            board: self.session.board().to_wire(assignment),
            computer_symbol: assignment.computer(),
            difficulty_level: *self.session.difficulty(),
        }
    }

    fn place_computer_move(
        &mut self,
        computer_move: Option<Coord>,
        events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        if let Some(coord) = computer_move {
            self.session.board_mut().set(coord, CellValue::Computer)?;
            debug!(%coord, "Applied computer move");
            events.push(Event::CellUpdated {
                coord,
                value: CellValue::Computer,
            });
        }
        Ok(())
    }

    fn check_echo(&self, echoed: Option<WireBoard>) {
        let Some(echoed) = echoed else {
            return;
        };
        let local = self.session.board().to_wire(self.session.assignment());
        if local != echoed {
            warn!(?local, ?echoed, "Echoed board differs from local board");
        }
    }

    fn end(&mut self, reason: EndReason, message: String, events: &mut Vec<Event>) {
        info!(%reason, %message, "Game ended");
        self.transition(GamePhase::Ended(reason), events);
        events.push(Event::GameEnded { reason, message });
    }

    fn transition(&mut self, next: GamePhase, events: &mut Vec<Event>) {
        let was = self.phase();
        if was == next {
            return;
        }
        self.session.set_phase(next);
        if was == GamePhase::WaitingForRemote || next == GamePhase::WaitingForRemote {
            events.push(Event::LoadingChanged(next == GamePhase::WaitingForRemote));
        }
        events.push(Event::PhaseChanged(next));
    }
}
