//! The board service contract.

use broadside_liveness::Liveness;
use broadside_protocol::{BoardView, MaskedBoardView, PlayerId, ShotResult};

use crate::BoardError;

/// What [`BoardService::create`] returns: the board's owner and a way to
/// watch the board for termination.
#[derive(Debug, Clone)]
pub struct BoardHandle {
    pub player_id: PlayerId,
    pub liveness: Liveness,
}

/// One board per player, addressed by the owning player's id.
///
/// Calls are synchronous. A match runs them on Tokio's blocking pool and
/// waits for the result before taking its next request, so a slow board
/// delays only the match that owns it.
pub trait BoardService: Send + Sync + 'static {
    /// Allocates a new board for `player_id`.
    fn create(&self, player_id: PlayerId) -> Result<BoardHandle, BoardError>;

    /// Releases the board for `player_id`.
    ///
    /// Must succeed when there is no such board.
    fn destroy(&self, player_id: PlayerId) -> Result<(), BoardError>;

    /// The full board, ships included.
    fn get_data(&self, player_id: PlayerId) -> Result<BoardView, BoardError>;

    /// The board as an opponent sees it: shots and outcomes only.
    fn get_opponents_data(
        &self,
        player_id: PlayerId,
    ) -> Result<MaskedBoardView, BoardError>;

    /// Fires at `(x, y)` on `player_id`'s board.
    fn take_shot(
        &self,
        player_id: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<ShotResult, BoardError>;
}
