//! In-memory board service.
//!
//! Every board lives in a shared map keyed by its owner. Each board also
//! owns a [`Lifeline`]; destroying the board drops it, which is what a
//! watching match observes as the board terminating.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use broadside_liveness::Lifeline;
use broadside_protocol::{
    BoardView, MaskedBoardView, PlayerId, Ship, ShotRecord, ShotResult,
};
use rand::Rng;

use crate::{BoardConfig, BoardError, BoardHandle, BoardService, Placement};

/// Attempts per ship before random placement gives up.
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;

/// A single player's board.
#[derive(Debug)]
struct Board {
    player_id: PlayerId,
    size: u8,
    ships: Vec<Ship>,
    hits: HashSet<(u8, u8)>,
    shots: Vec<ShotRecord>,
}

impl Board {
    fn new(player_id: PlayerId, size: u8, ships: Vec<Ship>) -> Self {
        Self {
            player_id,
            size,
            ships,
            hits: HashSet::new(),
            shots: Vec::new(),
        }
    }

    fn hit_points(&self) -> u32 {
        let cells: u32 = self.ships.iter().map(|s| u32::from(s.length)).sum();
        cells - self.hits.len() as u32
    }

    fn take_shot(&mut self, x: u8, y: u8) -> Result<ShotResult, BoardError> {
        if x >= self.size || y >= self.size {
            return Err(BoardError::OutOfBounds { x, y });
        }

        // Firing at the same cell twice changes nothing.
        if let Some(previous) = self.shots.iter().find(|s| s.x == x && s.y == y) {
            return Ok(previous.result);
        }

        let result = match self.ships.iter().find(|ship| ship.covers(x, y)) {
            None => ShotResult::Miss,
            Some(ship) => {
                self.hits.insert((x, y));
                if ship.cells().all(|cell| self.hits.contains(&cell)) {
                    ShotResult::Sunk
                } else {
                    ShotResult::Hit
                }
            }
        };

        self.shots.push(ShotRecord { x, y, result });
        Ok(result)
    }

    fn view(&self) -> BoardView {
        BoardView {
            player_id: self.player_id,
            ships: self.ships.clone(),
            shots: self.shots.clone(),
            hit_points: self.hit_points(),
        }
    }
}

struct Entry {
    board: Board,
    /// `None` once the board has been killed.
    lifeline: Option<Lifeline>,
}

/// A [`BoardService`] that keeps every board in process memory.
pub struct MemoryBoardService {
    config: BoardConfig,
    boards: Mutex<HashMap<PlayerId, Entry>>,
}

impl MemoryBoardService {
    /// Creates an empty service.
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if `player_id` currently has a board.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.boards()
            .map(|boards| boards.contains_key(&player_id))
            .unwrap_or(false)
    }

    /// Number of boards currently held.
    pub fn board_count(&self) -> usize {
        self.boards().map(|boards| boards.len()).unwrap_or(0)
    }

    /// Terminates a board's lifeline while leaving the board in place,
    /// as if the process behind it had crashed.
    ///
    /// Returns `false` if there is no live board for `player_id`.
    pub fn kill(&self, player_id: PlayerId) -> bool {
        let lifeline = match self.boards() {
            Ok(mut boards) => boards
                .get_mut(&player_id)
                .and_then(|entry| entry.lifeline.take()),
            Err(_) => None,
        };
        match lifeline {
            Some(lifeline) => {
                tracing::debug!(%player_id, "board killed");
                lifeline.cut();
                true
            }
            None => false,
        }
    }

    fn boards(&self) -> Result<MutexGuard<'_, HashMap<PlayerId, Entry>>, BoardError> {
        self.boards.lock().map_err(|_| BoardError::Unavailable)
    }

    fn place_fleet(&self) -> Result<Vec<Ship>, BoardError> {
        match &self.config.placement {
            Placement::Fixed(ships) => {
                let mut placed: Vec<Ship> = Vec::with_capacity(ships.len());
                for ship in ships {
                    if !fits(self.config.size, &placed, ship) {
                        return Err(BoardError::Placement(format!(
                            "ship at ({}, {}) of length {} overlaps or leaves the grid",
                            ship.x, ship.y, ship.length
                        )));
                    }
                    placed.push(ship.clone());
                }
                Ok(placed)
            }
            Placement::Random => {
                let mut rng = rand::rng();
                let mut placed: Vec<Ship> = Vec::with_capacity(self.config.fleet.len());
                for &length in &self.config.fleet {
                    if length == 0 || length > self.config.size {
                        return Err(BoardError::Placement(format!(
                            "ship of length {length} on a {0}x{0} grid",
                            self.config.size
                        )));
                    }
                    let ship = (0..MAX_PLACEMENT_ATTEMPTS)
                        .map(|_| random_ship(&mut rng, self.config.size, length))
                        .find(|candidate| fits(self.config.size, &placed, candidate))
                        .ok_or_else(|| {
                            BoardError::Placement(format!(
                                "no room for a ship of length {length}"
                            ))
                        })?;
                    placed.push(ship);
                }
                Ok(placed)
            }
        }
    }
}

impl BoardService for MemoryBoardService {
    fn create(&self, player_id: PlayerId) -> Result<BoardHandle, BoardError> {
        let ships = self.place_fleet()?;
        let mut boards = self.boards()?;
        if boards.contains_key(&player_id) {
            return Err(BoardError::AlreadyExists(player_id));
        }

        let (lifeline, liveness) = Lifeline::new();
        boards.insert(
            player_id,
            Entry {
                board: Board::new(player_id, self.config.size, ships),
                lifeline: Some(lifeline),
            },
        );
        tracing::debug!(%player_id, boards = boards.len(), "board created");

        Ok(BoardHandle { player_id, liveness })
    }

    fn destroy(&self, player_id: PlayerId) -> Result<(), BoardError> {
        let removed = self.boards()?.remove(&player_id);
        if removed.is_some() {
            tracing::debug!(%player_id, "board destroyed");
        }
        // The entry (and its lifeline) drops here, outside the lock.
        drop(removed);
        Ok(())
    }

    fn get_data(&self, player_id: PlayerId) -> Result<BoardView, BoardError> {
        let boards = self.boards()?;
        let entry = boards.get(&player_id).ok_or(BoardError::NotFound(player_id))?;
        Ok(entry.board.view())
    }

    fn get_opponents_data(
        &self,
        player_id: PlayerId,
    ) -> Result<MaskedBoardView, BoardError> {
        let view = self.get_data(player_id)?;
        Ok(MaskedBoardView::from(&view))
    }

    fn take_shot(
        &self,
        player_id: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<ShotResult, BoardError> {
        let mut boards = self.boards()?;
        let entry = boards
            .get_mut(&player_id)
            .ok_or(BoardError::NotFound(player_id))?;
        entry.board.take_shot(x, y)
    }
}

fn random_ship(rng: &mut impl Rng, size: u8, length: u8) -> Ship {
    let horizontal = rng.random_bool(0.5);
    let span = size.saturating_sub(length);
    let (x, y) = if horizontal {
        (rng.random_range(0..=span), rng.random_range(0..size))
    } else {
        (rng.random_range(0..size), rng.random_range(0..=span))
    };
    Ship {
        x,
        y,
        length,
        horizontal,
    }
}

/// Returns `true` if `ship` lies inside the grid and overlaps none of
/// `placed`.
fn fits(size: u8, placed: &[Ship], ship: &Ship) -> bool {
    if ship.length == 0 || ship.length > size {
        return false;
    }
    let (end_x, end_y) = if ship.horizontal {
        (u16::from(ship.x) + u16::from(ship.length), u16::from(ship.y) + 1)
    } else {
        (u16::from(ship.x) + 1, u16::from(ship.y) + u16::from(ship.length))
    };
    if end_x > u16::from(size) || end_y > u16::from(size) {
        return false;
    }
    !placed
        .iter()
        .any(|other| ship.cells().any(|(x, y)| other.covers(x, y)))
}
