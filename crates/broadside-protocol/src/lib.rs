//! Wire-level vocabulary for Broadside.
//!
//! This crate defines the values that cross the boundary of a match:
//!
//! - **Identity** ([`PlayerId`], [`MatchId`], [`ConnectionId`]): newtype
//!   ids that can't be mixed up with each other.
//! - **Views** ([`MatchView`], [`PlayerView`], [`BoardView`],
//!   [`MaskedBoardView`]): immutable snapshots returned to callers.
//! - **Envelopes** ([`MatchRequest`], [`MatchReply`]): the request/reply
//!   shapes a transport layer speaks.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes become bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about actors, boards, or liveness. It
//! only describes data:
//!
//! ```text
//! Transport (bytes) → Protocol (MatchRequest) → Match actor (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardView, ChatMessage, ConnectionId, MaskedBoardView, MatchId,
    MatchReply, MatchRequest, MatchView, PlayerId, PlayerView, Ship,
    ShotRecord, ShotResult, Turn,
};
