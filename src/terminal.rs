//! Line-oriented terminal front end.
//!
//! Type a cell number `1`-`9` to play, `r` to reset, `d <level>` to change
//! difficulty and `q` to quit. The board is redrawn after every batch of
//! session events.

use crate::config::ClientConfig;
use crate::driver::SessionHandle;
use anyhow::Result;
use derive_more::{Display, Error};
use std::sync::Arc;
use tictactoe_session::{
    CellValue, Command, Coord, Difficulty, Event, GamePhase, SymbolAssignment, WireBoard,
    render_grid,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Usage text shown on start and on `h`.
pub const HELP: &str = "Commands: 1-9 play a cell | r reset | d <easy|medium|hard> difficulty | h help | q quit";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    /// Play the cell with this number.
    Cell(Coord),
    /// Start over.
    Reset,
    /// Change difficulty.
    Difficulty(Difficulty),
    /// Show usage.
    Help,
    /// Leave the game.
    Quit,
}

/// Input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unrecognized input {input:?}: {reason}")]
pub struct InputError {
    /// What was typed.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InputError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parses a line typed by the player.
#[instrument]
pub fn parse_input(line: &str) -> Result<TerminalInput, InputError> {
    let trimmed = line.trim();
    let mut words = trimmed.split_whitespace();
    let Some(first) = words.next() else {
        return Err(InputError::new(line, "empty line"));
    };

    let input = match first.to_ascii_lowercase().as_str() {
        "q" | "quit" => TerminalInput::Quit,
        "h" | "help" | "?" => TerminalInput::Help,
        "r" | "reset" => TerminalInput::Reset,
        "d" | "difficulty" => {
            let level = words
                .next()
                .ok_or_else(|| InputError::new(line, "missing difficulty level"))?;
            let difficulty = level
                .parse::<Difficulty>()
                .map_err(|_| InputError::new(line, "expected easy, medium or hard"))?;
            TerminalInput::Difficulty(difficulty)
        }
        other => {
            let number = other
                .parse::<usize>()
                .map_err(|_| InputError::new(line, "unknown command"))?;
            let coord =
                Coord::from_linear(number).map_err(|e| InputError::new(line, e.to_string()))?;
            TerminalInput::Cell(coord)
        }
    };

    if words.next().is_some() {
        return Err(InputError::new(line, "unexpected trailing input"));
    }
    Ok(input)
}

/// What the terminal shows, rebuilt purely from session events.
#[derive(Debug, Clone)]
pub struct TerminalView {
    assignment: SymbolAssignment,
    cells: WireBoard,
    phase: GamePhase,
    loading: bool,
    notices: Vec<String>,
    dirty: bool,
}

impl TerminalView {
    /// Creates an empty view.
    pub fn new(assignment: SymbolAssignment) -> Self {
        Self {
            assignment,
            cells: WireBoard::default(),
            phase: GamePhase::Active,
            loading: false,
            notices: Vec::new(),
            dirty: true,
        }
    }

    /// Folds one event into the view.
    pub fn apply(&mut self, event: &Event) {
        debug!(?event, "Applying event to view");
        match event {
            Event::CellUpdated { coord, value } => {
                self.cells[coord.row()][coord.col()] = self.assignment.mark_for(*value);
                self.dirty = true;
            }
            Event::PhaseChanged(phase) => {
                self.phase = *phase;
                self.dirty = true;
            }
            Event::LoadingChanged(loading) => {
                self.loading = *loading;
                if *loading {
                    self.notices.push("Computer is thinking...".to_string());
                }
            }
            Event::GameEnded { message, .. } => {
                self.notices.push(message.clone());
                self.notices.push("Type r to play again.".to_string());
            }
        }
    }

    /// True while a move request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last phase seen.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Mark shown in a cell.
    pub fn value_at(&self, coord: Coord) -> CellValue {
        self.assignment.value_for(self.cells[coord.row()][coord.col()])
    }

    /// Text to print for everything applied since the last call.
    pub fn take_output(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        if self.dirty {
            lines.push(self.render());
            self.dirty = false;
        }
        lines.append(&mut self.notices);
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Formats the board with the human's and computer's symbols.
    pub fn render(&self) -> String {
        render_grid(&self.cells)
    }
}

/// Plays one session in the terminal until the player quits or stdin closes.
#[instrument(skip_all, fields(endpoint = %config.endpoint()))]
pub async fn run_terminal(config: ClientConfig) -> Result<()> {
    info!("Starting terminal session");
    let service = Arc::new(config.move_client());
    let mut handle = SessionHandle::spawn(config.controller(), service);
    let mut view = TerminalView::new(config.assignment());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "You are {}, the computer is {} ({}).",
        config.assignment().human(),
        config.assignment().computer(),
        config.difficulty()
    );
    println!("{}", HELP);
    if let Some(output) = view.take_output() {
        println!("{}", output);
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Ok(TerminalInput::Quit) => break,
                    Ok(TerminalInput::Help) => println!("{}", HELP),
                    Ok(TerminalInput::Cell(coord)) => {
                        if view.is_loading() {
                            println!("Still waiting for the computer.");
                        }
                        handle.send(Command::ClickCell(coord)).await?;
                    }
                    Ok(TerminalInput::Reset) => handle.send(Command::Reset).await?,
                    Ok(TerminalInput::Difficulty(level)) => {
                        handle.send(Command::SetDifficulty(level)).await?;
                        println!("Difficulty set to {}.", level);
                    }
                    Err(e) => println!("{}", e),
                }
            }
            event = handle.next_event() => {
                let Some(event) = event else {
                    debug!("Session driver stopped");
                    break;
                };
                view.apply(&event);
                while let Some(event) = handle.try_next_event() {
                    view.apply(&event);
                }
                if let Some(output) = view.take_output() {
                    println!("{}", output);
                }
            }
        }
    }

    let controller = handle.shutdown().await?;
    info!(phase = %controller.phase(), epoch = %controller.epoch(), "Terminal session finished");
    Ok(())
}
