//! Match sessions for Broadside.
//!
//! Each match runs as an isolated Tokio task (actor model) that owns its
//! [`MatchSession`]. Requests are served one at a time, so every state
//! transition is atomic with respect to other calls on the same match.
//! The actor also watches both player connections and both boards; the
//! first of those to die stops the match and releases its boards.
//!
//! # Key types
//!
//! - [`MatchDirectory`]: starts matches and resolves them by id
//! - [`MatchHandle`]: send requests to a running match actor
//! - [`MatchSession`]: the match state machine data
//! - [`MatchObserver`]: lifecycle notifications
//! - [`MatchConfig`]: call timeout and channel sizing

mod actor;
mod config;
mod directory;
mod error;
mod observer;
mod session;

pub use actor::MatchHandle;
pub use config::{MatchConfig, MatchPhase};
pub use directory::MatchDirectory;
pub use error::MatchError;
pub use observer::{MatchObserver, TracingObserver};
pub use session::{Admission, ConnectionHandle, MatchSession, Seat};
