//! Unified error type for Broadside.

use broadside_board::BoardError;
use broadside_match::MatchError;
use broadside_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The board service failed outside of a match call.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A match rejected the call or could not be reached.
    #[error(transparent)]
    Match(#[from] MatchError),
}
