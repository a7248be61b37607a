//! Tests for the async session driver.

use async_trait::async_trait;
use axum::routing::post;
use axum::{Json, Router};
use remote_tictactoe::{HttpMoveClient, MoveService, SessionDriver, SessionHandle};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tictactoe_session::{
    CellValue, Command, Coord, Difficulty, EndReason, Event, GENERIC_ERROR_MESSAGE, GamePhase,
    GameStatus, MoveError, MoveOutcome, MoveReply, PendingMove, SessionController,
};
use tokio::sync::{mpsc, oneshot};

type Reply = Result<MoveReply, MoveError>;

/// Answers the request of epoch `n` with the `n`th scripted reply once the
/// test releases it.
struct ScriptedService {
    gates: Mutex<HashMap<u64, oneshot::Receiver<Reply>>>,
    requests: Mutex<Vec<PendingMove>>,
}

impl ScriptedService {
    fn new(gates: Vec<oneshot::Receiver<Reply>>) -> Arc<Self> {
        Arc::new(Self {
            gates: Mutex::new((0u64..).zip(gates).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests seen so far, ordered by epoch.
    fn requests(&self) -> Vec<PendingMove> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort_by_key(|pending| pending.epoch().value());
        requests
    }
}

#[async_trait]
impl MoveService for ScriptedService {
    async fn request_move(&self, pending: PendingMove) -> MoveOutcome {
        let epoch = *pending.epoch();
        self.requests.lock().unwrap().push(pending);
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(&epoch.value())
            .expect("unexpected move request");
        let result = gate
            .await
            .unwrap_or_else(|_| Err(MoveError::network("script dropped")));
        MoveOutcome::new(epoch, result)
    }
}

/// Service whose request task dies before producing an outcome.
struct PanickingService;

#[async_trait]
impl MoveService for PanickingService {
    async fn request_move(&self, _pending: PendingMove) -> MoveOutcome {
        panic!("move service crashed");
    }
}

fn coord(row: usize, col: usize) -> Coord {
    Coord::new(row, col).unwrap()
}

fn ongoing(row: usize, col: usize) -> Reply {
    Ok(MoveReply::new(GameStatus::Ongoing, Some(coord(row, col)), None))
}

async fn next_event(handle: &mut SessionHandle) -> Event {
    tokio::time::timeout(Duration::from_secs(1), handle.next_event())
        .await
        .expect("event within a second")
        .expect("driver still running")
}

/// Collects events up to and including the first one matching `last`.
async fn events_until(handle: &mut SessionHandle, last: Event) -> Vec<Event> {
    let mut seen = Vec::new();
    loop {
        let event = next_event(handle).await;
        let done = event == last;
        seen.push(event);
        if done {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_click_and_reply() {
    let (tx, rx) = oneshot::channel();
    let service = ScriptedService::new(vec![rx]);
    let mut handle = SessionHandle::spawn(SessionController::default(), service.clone());

    handle.send(Command::ClickCell(coord(0, 0))).await.unwrap();
    let events = events_until(
        &mut handle,
        Event::PhaseChanged(GamePhase::WaitingForRemote),
    )
    .await;
    assert_eq!(
        events,
        vec![
            Event::CellUpdated {
                coord: coord(0, 0),
                value: CellValue::Human
            },
            Event::LoadingChanged(true),
            Event::PhaseChanged(GamePhase::WaitingForRemote),
        ]
    );

    tx.send(ongoing(1, 1)).unwrap();
    let events = events_until(&mut handle, Event::PhaseChanged(GamePhase::Active)).await;
    assert_eq!(
        events,
        vec![
            Event::CellUpdated {
                coord: coord(1, 1),
                value: CellValue::Computer
            },
            Event::LoadingChanged(false),
            Event::PhaseChanged(GamePhase::Active),
        ]
    );

    let controller = handle.shutdown().await.unwrap();
    assert_eq!(controller.session().board().mark_count(), 2);
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn test_clicks_while_waiting_send_nothing() {
    let (tx, rx) = oneshot::channel();
    let service = ScriptedService::new(vec![rx]);
    let mut handle = SessionHandle::spawn(SessionController::default(), service.clone());

    handle.send(Command::ClickCell(coord(0, 0))).await.unwrap();
    events_until(
        &mut handle,
        Event::PhaseChanged(GamePhase::WaitingForRemote),
    )
    .await;
    handle.send(Command::ClickCell(coord(2, 2))).await.unwrap();
    handle.send(Command::ClickCell(coord(0, 1))).await.unwrap();

    tx.send(ongoing(1, 1)).unwrap();
    events_until(&mut handle, Event::PhaseChanged(GamePhase::Active)).await;

    let controller = handle.shutdown().await.unwrap();
    assert_eq!(service.requests().len(), 1);
    let board = controller.session().board();
    assert_eq!(board.get(coord(2, 2)), CellValue::Empty);
    assert_eq!(board.get(coord(0, 1)), CellValue::Empty);
}

#[tokio::test]
async fn test_reset_during_flight_discards_late_reply() {
    let (tx, rx) = oneshot::channel();
    let service = ScriptedService::new(vec![rx]);
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let driver = SessionDriver::new(SessionController::default(), service.clone());
    let task = tokio::spawn(driver.run(command_rx, event_tx));

    command_tx
        .send(Command::ClickCell(coord(0, 0)))
        .await
        .unwrap();
    command_tx.send(Command::Reset).await.unwrap();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(1), event_rx.recv())
            .await
            .expect("event within a second")
            .expect("driver running");
        if event == Event::PhaseChanged(GamePhase::Active) {
            break;
        }
    }

    // Release the reply for the abandoned request and let it land.
    tx.send(ongoing(1, 1)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(event_rx.try_recv().is_err(), "late reply produced events");

    drop(command_tx);
    let controller = task.await.unwrap();
    assert_eq!(controller.phase(), GamePhase::Active);
    assert_eq!(controller.epoch().value(), 1);
    assert_eq!(controller.session().board().mark_count(), 0);
    assert_eq!(service.requests().len(), 1);
    assert_eq!(service.requests()[0].epoch().value(), 0);
}

#[tokio::test]
async fn test_new_request_after_reset_carries_new_epoch() {
    let (stale_tx, stale_rx) = oneshot::channel();
    let (fresh_tx, fresh_rx) = oneshot::channel();
    let service = ScriptedService::new(vec![stale_rx, fresh_rx]);
    let mut handle = SessionHandle::spawn(SessionController::default(), service.clone());

    handle.send(Command::ClickCell(coord(0, 0))).await.unwrap();
    handle.send(Command::Reset).await.unwrap();
    handle.send(Command::ClickCell(coord(2, 2))).await.unwrap();
    handle.send(Command::SetDifficulty(Difficulty::Hard)).await.unwrap();

    // The stale reply points at a cell the fresh game has not used.
    stale_tx.send(ongoing(0, 1)).unwrap();
    fresh_tx
        .send(Ok(MoveReply::new(GameStatus::WinX, Some(coord(1, 1)), None)))
        .unwrap();

    let mut ended = None;
    for _ in 0..32 {
        if let Event::GameEnded { reason, .. } = next_event(&mut handle).await {
            ended = Some(reason);
            break;
        }
    }
    assert_eq!(ended, Some(EndReason::WonByComputer));

    let controller = handle.shutdown().await.unwrap();
    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].epoch().value(), 1);
    assert_eq!(requests[1].request().difficulty_level, Difficulty::Easy);
    let board = controller.session().board();
    assert_eq!(board.get(coord(0, 1)), CellValue::Empty);
    assert_eq!(board.get(coord(1, 1)), CellValue::Computer);
    assert_eq!(*controller.session().difficulty(), Difficulty::Hard);
}

#[tokio::test]
async fn test_failed_exchange_ends_game() {
    let (tx, rx) = oneshot::channel();
    let service = ScriptedService::new(vec![rx]);
    let mut handle = SessionHandle::spawn(SessionController::default(), service);

    handle.send(Command::ClickCell(coord(1, 1))).await.unwrap();
    tx.send(Err(MoveError::remote("Invalid board"))).unwrap();

    let events = events_until(
        &mut handle,
        Event::GameEnded {
            reason: EndReason::Errored,
            message: "Invalid board".to_string(),
        },
    )
    .await;
    assert!(events.contains(&Event::LoadingChanged(false)));
    assert!(events.contains(&Event::PhaseChanged(GamePhase::Ended(EndReason::Errored))));
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_crashed_request_task_ends_game() {
    let mut handle =
        SessionHandle::spawn(SessionController::default(), Arc::new(PanickingService));

    handle.send(Command::ClickCell(coord(1, 1))).await.unwrap();
    let events = events_until(
        &mut handle,
        Event::GameEnded {
            reason: EndReason::Errored,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        },
    )
    .await;

    assert!(events.contains(&Event::LoadingChanged(false)));
    let controller = handle.shutdown().await.unwrap();
    assert_eq!(controller.phase(), GamePhase::Ended(EndReason::Errored));
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_driver_stops_when_events_dropped() {
    let (_held, rx) = oneshot::channel();
    let service = ScriptedService::new(vec![rx]);
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(8);
    drop(event_rx);
    let driver = SessionDriver::new(SessionController::default(), service);
    let task = tokio::spawn(driver.run(command_rx, event_tx));

    command_tx
        .send(Command::ClickCell(coord(0, 0)))
        .await
        .unwrap();
    let controller = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("driver stops")
        .unwrap();

    assert_eq!(controller.phase(), GamePhase::WaitingForRemote);
    assert!(command_tx.send(Command::Reset).await.is_err());
}

#[tokio::test]
async fn test_full_game_over_http() {
    let router = Router::new().route(
        "/api/get_computer_move",
        post(|Json(body): Json<serde_json::Value>| async move {
            let marks = body["board"]
                .as_array()
                .into_iter()
                .flatten()
                .flat_map(|row| row.as_array().cloned().unwrap_or_default())
                .filter(|cell| !cell.is_null())
                .count();
            if marks == 1 {
                Json(json!({"success": true, "computer_move": [1, 1], "game_status": "ongoing"}))
            } else {
                Json(json!({"success": true, "computer_move": [-1, -1], "game_status": "win-O"}))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let client = Arc::new(HttpMoveClient::new(format!(
        "http://{}/api/get_computer_move",
        addr
    )));
    let mut handle = SessionHandle::spawn(SessionController::default(), client);

    handle.send(Command::ClickCell(coord(0, 0))).await.unwrap();
    events_until(&mut handle, Event::PhaseChanged(GamePhase::Active)).await;
    handle.send(Command::ClickCell(coord(0, 1))).await.unwrap();
    let events = events_until(
        &mut handle,
        Event::GameEnded {
            reason: EndReason::WonByHuman,
            message: "You Won!".to_string(),
        },
    )
    .await;
    assert!(events.contains(&Event::PhaseChanged(GamePhase::Ended(EndReason::WonByHuman))));

    let controller = handle.shutdown().await.unwrap();
    assert_eq!(controller.session().board().mark_count(), 3);
}
