//! Core value types for Broadside.
//!
//! Everything here is plain data: ids, shot outcomes, board views, match
//! snapshots and the request/reply envelopes. A value handed to a caller is
//! always an owned snapshot, never a reference into live match state.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a match (one game between two players).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Opaque identifier for a player's transport connection.
///
/// Only used for addressing and liveness monitoring inside a match. It is
/// deliberately not serializable: connection identity never leaves the
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Shots and turns
// ---------------------------------------------------------------------------

/// The outcome of one shot, as reported by the board that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotResult {
    Miss,
    Hit,
    /// The shot hit the last intact cell of a ship.
    Sunk,
}

impl fmt::Display for ShotResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::Hit => write!(f, "hit"),
            Self::Sunk => write!(f, "sunk"),
        }
    }
}

/// One resolved shot in a match. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who fired.
    pub player_id: PlayerId,
    pub x: u8,
    pub y: u8,
    pub result: ShotResult,
}

/// A chat line posted to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub player_id: PlayerId,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Board views
// ---------------------------------------------------------------------------

/// A ship placed on a board.
///
/// Occupies `length` cells starting at `(x, y)` and extending right when
/// `horizontal`, down otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub x: u8,
    pub y: u8,
    pub length: u8,
    pub horizontal: bool,
}

impl Ship {
    /// Returns every cell the ship covers.
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.length).map(move |i| {
            if self.horizontal {
                (self.x + i, self.y)
            } else {
                (self.x, self.y + i)
            }
        })
    }

    /// Returns `true` if the ship covers `(x, y)`.
    pub fn covers(&self, x: u8, y: u8) -> bool {
        self.cells().any(|cell| cell == (x, y))
    }
}

/// A shot as seen from the receiving board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub x: u8,
    pub y: u8,
    pub result: ShotResult,
}

/// The full view of a board: only ever shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub player_id: PlayerId,
    pub ships: Vec<Ship>,
    /// Shots received, oldest first.
    pub shots: Vec<ShotRecord>,
    /// Ship cells not hit yet. Zero means the fleet is gone.
    pub hit_points: u32,
}

/// What an opponent may see of a board: the shots and their outcomes,
/// never where the ships are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedBoardView {
    pub player_id: PlayerId,
    pub shots: Vec<ShotRecord>,
}

impl From<&BoardView> for MaskedBoardView {
    fn from(board: &BoardView) -> Self {
        Self {
            player_id: board.player_id,
            shots: board.shots.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match views
// ---------------------------------------------------------------------------

/// Snapshot of a match as any caller may see it.
///
/// Connection handles are not part of this type at all, so no code path can
/// leak them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub id: MatchId,
    pub attacker: Option<PlayerId>,
    pub defender: Option<PlayerId>,
    /// Most recent first.
    pub turns: Vec<Turn>,
    /// Oldest first.
    pub messages: Vec<ChatMessage>,
    pub over: bool,
    pub winner: Option<PlayerId>,
}

/// A match snapshot from one player's seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub game: MatchView,
    pub my_board: BoardView,
    /// `None` until an opponent has joined.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub opponents_board: Option<MaskedBoardView>,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// A request addressed to one match.
///
/// `join` is not representable here: it carries a live connection handle,
/// which only exists on the server side.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "PlayerShot", "player_id": 1, "x": 3, "y": 4 }`. Any tag we
/// don't know decodes to [`MatchRequest::Unsupported`] so the match can
/// answer it with an error instead of the transport dropping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchRequest {
    GetData,
    GetPlayerData { player_id: PlayerId },
    AddMessage { player_id: PlayerId, text: String },
    PlayerShot { player_id: PlayerId, x: u8, y: u8 },
    PlayerLeft { player_id: PlayerId },
    #[serde(other)]
    Unsupported,
}

impl MatchRequest {
    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetData => "get_data",
            Self::GetPlayerData { .. } => "get_player_data",
            Self::AddMessage { .. } => "add_message",
            Self::PlayerShot { .. } => "player_shot",
            Self::PlayerLeft { .. } => "player_left",
            Self::Unsupported => "unsupported",
        }
    }
}

/// The answer to a [`MatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchReply {
    Game(MatchView),
    Player(PlayerView),
    Error { reason: String },
}

// =========================================================================
// Tests
// =========================================================================
