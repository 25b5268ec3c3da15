//! # Broadside
//!
//! Coordination for two-player naval combat matches.
//!
//! Each match is an actor that seats two players, resolves their shots
//! against per-player boards, decides the winner, and tears itself down
//! the moment a player's connection or board goes away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn run() -> Result<(), BroadsideError> {
//! let directory = Broadside::builder().build(MemoryBoardService::new(BoardConfig::default()));
//! let match_id = directory.create();
//!
//! let (_lifeline, liveness) = Lifeline::new();
//! directory
//!     .join(match_id, PlayerId(1), ConnectionHandle::new(ConnectionId::new(1), liveness))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod handler;
mod logging;

pub use builder::{Broadside, BroadsideBuilder, BroadsideConfig};
pub use error::BroadsideError;
pub use handler::serve_request;
pub use logging::init_tracing;

/// Everything needed to run matches, in one import.
pub mod prelude {
    pub use crate::{Broadside, BroadsideConfig, BroadsideError, init_tracing, serve_request};
    pub use broadside_board::{
        BoardConfig, BoardError, BoardHandle, BoardService, MemoryBoardService, Placement,
    };
    pub use broadside_liveness::{Lifeline, Liveness};
    pub use broadside_match::{
        ConnectionHandle, MatchConfig, MatchDirectory, MatchError, MatchHandle,
        MatchObserver, MatchPhase, TracingObserver,
    };
    pub use broadside_protocol::{
        BoardView, Codec, ConnectionId, JsonCodec, MaskedBoardView, MatchId, MatchReply,
        MatchRequest, MatchView, PlayerId, PlayerView, Ship, ShotResult, Turn,
    };
}
