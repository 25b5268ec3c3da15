//! Shared fixtures for match integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use broadside_board::{
    BoardConfig, BoardError, BoardHandle, BoardService, MemoryBoardService, Placement,
};
use broadside_liveness::Lifeline;
use broadside_match::{ConnectionHandle, MatchConfig, MatchDirectory, MatchObserver};
use broadside_protocol::{
    BoardView, ConnectionId, MaskedBoardView, MatchId, PlayerId, Ship, ShotResult, Turn,
};

pub const A: PlayerId = PlayerId(1);
pub const B: PlayerId = PlayerId(2);
pub const C: PlayerId = PlayerId(3);

// =========================================================================
// Boards
// =========================================================================

/// Wraps the in-memory service and records every destroy call.
pub struct CountingBoards {
    pub inner: MemoryBoardService,
    pub destroyed: Mutex<Vec<PlayerId>>,
    /// Blocking delay inside every `take_shot`, like a slow backend.
    pub shot_delay: Duration,
    /// While set, `get_data` fails.
    pub fail_reads: AtomicBool,
}

impl CountingBoards {
    /// Boards with two ships: a one-cell boat at (0, 0) and a two-cell
    /// boat at (2, 2)-(3, 2).
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(shot_delay: Duration) -> Self {
        Self {
            inner: MemoryBoardService::new(BoardConfig {
                size: 5,
                fleet: vec![],
                placement: Placement::Fixed(vec![
                    Ship { x: 0, y: 0, length: 1, horizontal: true },
                    Ship { x: 2, y: 2, length: 2, horizontal: true },
                ]),
            }),
            destroyed: Mutex::new(Vec::new()),
            shot_delay,
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn destroyed(&self) -> Vec<PlayerId> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl BoardService for CountingBoards {
    fn create(&self, player_id: PlayerId) -> Result<BoardHandle, BoardError> {
        self.inner.create(player_id)
    }

    fn destroy(&self, player_id: PlayerId) -> Result<(), BoardError> {
        self.destroyed.lock().unwrap().push(player_id);
        self.inner.destroy(player_id)
    }

    fn get_data(&self, player_id: PlayerId) -> Result<BoardView, BoardError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BoardError::Unavailable);
        }
        self.inner.get_data(player_id)
    }

    fn get_opponents_data(&self, player_id: PlayerId) -> Result<MaskedBoardView, BoardError> {
        self.inner.get_opponents_data(player_id)
    }

    fn take_shot(&self, player_id: PlayerId, x: u8, y: u8) -> Result<ShotResult, BoardError> {
        if !self.shot_delay.is_zero() {
            std::thread::sleep(self.shot_delay);
        }
        self.inner.take_shot(player_id, x, y)
    }
}

// =========================================================================
// Observer
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(MatchId),
    Joined(MatchId, PlayerId),
    Shot(MatchId, Turn),
    Stopped(MatchId),
    Over(MatchId, Option<PlayerId>),
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl MatchObserver for RecordingObserver {
    fn created(&self, match_id: MatchId) {
        self.push(Event::Created(match_id));
    }

    fn player_joined(&self, match_id: MatchId, player_id: PlayerId) {
        self.push(Event::Joined(match_id, player_id));
    }

    fn player_shot(&self, match_id: MatchId, turn: &Turn) {
        self.push(Event::Shot(match_id, turn.clone()));
    }

    fn stopped(&self, match_id: MatchId) {
        self.push(Event::Stopped(match_id));
    }

    fn over(&self, match_id: MatchId, winner: Option<PlayerId>) {
        self.push(Event::Over(match_id, winner));
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub directory: MatchDirectory,
    pub boards: Arc<CountingBoards>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(CountingBoards::new(), MatchConfig::default())
    }

    pub fn with(boards: CountingBoards, config: MatchConfig) -> Self {
        let boards = Arc::new(boards);
        let observer = Arc::new(RecordingObserver::default());
        let directory = MatchDirectory::with_observer(
            Arc::clone(&boards) as Arc<dyn BoardService>,
            Arc::clone(&observer) as Arc<dyn MatchObserver>,
            config,
        );
        Self {
            directory,
            boards,
            observer,
        }
    }

    /// Starts a match and seats A and B. Returns their lifelines.
    pub async fn two_player_match(&self, match_id: MatchId) -> (Lifeline, Lifeline) {
        self.directory.start(match_id).unwrap();
        let (a_line, a_conn) = connection(1);
        let (b_line, b_conn) = connection(2);
        self.directory.join(match_id, A, a_conn).await.unwrap();
        self.directory.join(match_id, B, b_conn).await.unwrap();
        (a_line, b_line)
    }
}

/// A live connection: keep the lifeline to keep it alive.
pub fn connection(id: u64) -> (Lifeline, ConnectionHandle) {
    let (lifeline, liveness) = Lifeline::new();
    (lifeline, ConnectionHandle::new(ConnectionId::new(id), liveness))
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
