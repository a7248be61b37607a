//! Runs a session controller against a move service on one task.
//!
//! Commands are handled strictly in arrival order. Move requests run on
//! their own tasks and their outcomes are fed back into the same loop, so a
//! reset is applied immediately even while a request is still in flight.
//! The late outcome is then dropped by its epoch. A request task that
//! panics is delivered as a network failure for its epoch.

use crate::client::MoveService;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::Arc;
use tictactoe_session::{
    Command, Event, MoveError, MoveOutcome, PendingMove, RequestEpoch, SessionController,
};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument};

/// Capacity of the command and event channels.
const CHANNEL_CAPACITY: usize = 64;

/// Session driver error.
#[derive(Debug, Clone, Display, Error)]
#[display("Driver error: {} at {}:{}", message, file, line)]
pub struct DriverError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DriverError {
    /// Creates a new driver error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Driver error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Owns the controller and the move service for one session.
pub struct SessionDriver {
    controller: SessionController,
    service: Arc<dyn MoveService>,
}

impl SessionDriver {
    /// Creates a driver.
    pub fn new(controller: SessionController, service: Arc<dyn MoveService>) -> Self {
        Self {
            controller,
            service,
        }
    }

    /// Processes commands until the command channel closes or the event
    /// receiver goes away, then returns the controller.
    ///
    /// Requests still in flight when the loop ends are aborted.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::Sender<Event>,
    ) -> SessionController {
        info!("Session driver started");
        let mut in_flight: JoinSet<MoveOutcome> = JoinSet::new();
        let mut epochs: HashMap<task::Id, RequestEpoch> = HashMap::new();

        loop {
            let emitted = tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("Command channel closed");
                        break;
                    };
                    let dispatch = self.controller.dispatch(command);
                    if let Some(pending) = dispatch.request {
                        let epoch = *pending.epoch();
                        let id = self.spawn_request(&mut in_flight, pending);
                        epochs.insert(id, epoch);
                    }
                    dispatch.events
                }
                Some(joined) = in_flight.join_next_with_id() => match joined {
                    Ok((id, outcome)) => {
                        epochs.remove(&id);
                        self.controller.deliver(outcome)
                    }
                    Err(e) => match epochs.remove(&e.id()) {
                        Some(epoch) => {
                            error!(error = %e, %epoch, "Move request task failed");
                            let failure =
                                MoveError::network(format!("Move request task failed: {}", e));
                            self.controller.deliver(MoveOutcome::failure(epoch, failure))
                        }
                        None => {
                            error!(error = %e, "Untracked move request task failed");
                            Vec::new()
                        }
                    },
                },
            };

            for event in emitted {
                if events.send(event).await.is_err() {
                    info!("Event receiver dropped, stopping session driver");
                    return self.controller;
                }
            }
        }

        info!(pending = in_flight.len(), "Session driver stopped");
        self.controller
    }

    fn spawn_request(
        &self,
        in_flight: &mut JoinSet<MoveOutcome>,
        pending: PendingMove,
    ) -> task::Id {
        debug!(epoch = %pending.epoch(), "Spawning move request");
        let service = Arc::clone(&self.service);
        in_flight
            .spawn(async move { service.request_move(pending).await })
            .id()
    }
}

/// Adapter-facing side of a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<Event>,
    task: JoinHandle<SessionController>,
}

impl SessionHandle {
    /// Starts a driver for `controller` on a new task.
    #[instrument(skip_all)]
    pub fn spawn(controller: SessionController, service: Arc<dyn MoveService>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let driver = SessionDriver::new(controller, service);
        let task = tokio::spawn(driver.run(command_rx, event_tx));
        Self {
            commands: command_tx,
            events: event_rx,
            task,
        }
    }

    /// Queues a command.
    pub async fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::new("Session driver is no longer running"))
    }

    /// Waits for the next event. `None` once the driver has stopped.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Returns an already-queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Stops the driver and returns the final controller state.
    pub async fn shutdown(self) -> Result<SessionController, DriverError> {
        let Self {
            commands,
            events,
            task,
        } = self;
        drop(commands);
        drop(events);
        task.await
            .map_err(|e| DriverError::new(format!("Session driver task failed: {}", e)))
    }
}
