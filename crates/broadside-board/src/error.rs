//! Error types for the board layer.

use broadside_protocol::PlayerId;

/// Errors a [`BoardService`](crate::BoardService) can report.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// No board exists for this player.
    #[error("no board for player {0}")]
    NotFound(PlayerId),

    /// The player already has a board.
    #[error("player {0} already has a board")]
    AlreadyExists(PlayerId),

    /// The shot lands outside the grid.
    #[error("shot at ({x}, {y}) is off the board")]
    OutOfBounds { x: u8, y: u8 },

    /// The fleet couldn't be placed on the grid.
    #[error("fleet placement failed: {0}")]
    Placement(String),

    /// The board store is unusable (a previous holder panicked).
    #[error("board service unavailable")]
    Unavailable,
}
