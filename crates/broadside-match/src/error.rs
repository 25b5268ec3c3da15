//! Error types for the match layer.

use broadside_board::BoardError;
use broadside_protocol::{MatchId, PlayerId};

/// Errors that can occur during match operations.
///
/// Domain failures (a full match, an unknown id) are ordinary values the
/// caller can act on. None of them stop the match actor.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Both seats are taken by other players.
    #[error("No more players allowed")]
    NoMorePlayers,

    /// No running match has this id.
    #[error("Game does not exist")]
    GameDoesNotExist(MatchId),

    /// A match with this id is already running.
    #[error("match {0} already exists")]
    AlreadyExists(MatchId),

    /// The player holds neither seat in this match.
    #[error("player {0} is not seated in this match")]
    UnknownPlayer(PlayerId),

    /// A shot needs two seated players.
    #[error("player {0} has no opponent yet")]
    NoOpponent(PlayerId),

    /// The match received a request it does not handle.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The match didn't answer within the configured call timeout.
    #[error("match {0} did not reply in time")]
    Timeout(MatchId),

    /// The match actor is gone (its command channel is closed).
    #[error("match {0} is unavailable")]
    Unavailable(MatchId),

    /// The board service rejected a call.
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl MatchError {
    /// Maps "the actor is gone" onto "the game does not exist".
    ///
    /// A caller that resolved a match just before it terminated sees the
    /// same answer as one that arrives after.
    pub(crate) fn or_gone(self, match_id: MatchId) -> Self {
        match self {
            Self::Unavailable(_) => Self::GameDoesNotExist(match_id),
            other => other,
        }
    }
}
