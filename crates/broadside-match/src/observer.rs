//! Lifecycle notifications.

use broadside_protocol::{MatchId, PlayerId, Turn};

/// Receives lifecycle events from match actors.
///
/// Called synchronously from inside the actor at each transition. Return
/// values are not consumed and a panicking observer is contained by the
/// actor, so an observer can never change how a match plays out. Every
/// method defaults to a no-op.
pub trait MatchObserver: Send + Sync + 'static {
    /// A match actor started.
    fn created(&self, _match_id: MatchId) {}

    /// A player took a seat.
    fn player_joined(&self, _match_id: MatchId, _player_id: PlayerId) {}

    /// A shot was resolved and recorded.
    fn player_shot(&self, _match_id: MatchId, _turn: &Turn) {}

    /// The match actor stopped after a peer terminated.
    fn stopped(&self, _match_id: MatchId) {}

    /// The match is finished for good. `winner` is whatever was recorded,
    /// possibly nobody.
    fn over(&self, _match_id: MatchId, _winner: Option<PlayerId>) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn created(&self, match_id: MatchId) {
        tracing::info!(%match_id, "match created");
    }

    fn player_joined(&self, match_id: MatchId, player_id: PlayerId) {
        tracing::info!(%match_id, %player_id, "player joined");
    }

    fn player_shot(&self, match_id: MatchId, turn: &Turn) {
        tracing::info!(
            %match_id,
            player_id = %turn.player_id,
            x = turn.x,
            y = turn.y,
            result = %turn.result,
            "player shot"
        );
    }

    fn stopped(&self, match_id: MatchId) {
        tracing::info!(%match_id, "match stopped");
    }

    fn over(&self, match_id: MatchId, winner: Option<PlayerId>) {
        match winner {
            Some(winner) => tracing::info!(%match_id, %winner, "match over"),
            None => tracing::info!(%match_id, "match over without a winner"),
        }
    }
}
