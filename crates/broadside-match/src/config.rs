//! Match configuration and lifecycle phases.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every match a directory starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Upper bound on one request/response call to a match, including the
    /// time spent queued behind other requests.
    pub call_timeout: Duration,

    /// Capacity of each match's command channel. Callers wait when it is
    /// full.
    pub channel_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchPhase
// ---------------------------------------------------------------------------

/// Where a match is in its lifecycle.
///
/// ```text
/// Empty → OnePlayer → Active → Over
///   └────────┴──────────┴───────┴──→ Terminated
/// ```
///
/// - **Empty**: no one has joined.
/// - **OnePlayer**: the attacker is seated, waiting for a defender.
/// - **Active**: both seats are taken and no outcome is recorded.
/// - **Over**: a winner was determined or a player left. The match keeps
///   serving requests.
/// - **Terminated**: a watched connection or board died. Reachable from
///   every other phase and final. A match whose handles have all been
///   dropped also ends here: nobody can reach it any more, so it releases
///   its boards the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Empty,
    OnePlayer,
    Active,
    Over,
    Terminated,
}

impl MatchPhase {
    /// Returns `true` if another player can still take a seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Empty | Self::OnePlayer)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::OnePlayer => write!(f, "OnePlayer"),
            Self::Active => write!(f, "Active"),
            Self::Over => write!(f, "Over"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}
