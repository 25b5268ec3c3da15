//! Wire-level request handling: bytes in, bytes out.
//!
//! Transports hand the raw payload of a request addressed to one match to
//! [`serve_request`] and send back whatever it returns. Match-level failures
//! travel inside the reply as [`MatchReply::Error`]; only payloads that
//! cannot be decoded or encoded surface as a Rust error.

use broadside_match::MatchDirectory;
use broadside_protocol::{Codec, MatchId, MatchReply, MatchRequest};

use crate::BroadsideError;

/// Decodes a [`MatchRequest`], routes it to match `match_id`, and encodes
/// the [`MatchReply`].
///
/// # Errors
/// [`BroadsideError::Protocol`] if `data` is not a valid request or the
/// reply cannot be encoded.
pub async fn serve_request<C: Codec>(
    directory: &MatchDirectory,
    codec: &C,
    match_id: MatchId,
    data: &[u8],
) -> Result<Vec<u8>, BroadsideError> {
    let request: MatchRequest = codec.decode(data)?;
    let operation = request.name();
    tracing::debug!(%match_id, operation, "serving request");

    let reply = directory.dispatch(match_id, request).await;
    if let MatchReply::Error { reason } = &reply {
        tracing::debug!(%match_id, operation, %reason, "request rejected");
    }

    Ok(codec.encode(&reply)?)
}
