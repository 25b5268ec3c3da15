//! `Broadside` builder: wires a board service, an observer, and match
//! configuration into a [`MatchDirectory`].

use std::sync::Arc;
use std::time::Duration;

use broadside_board::{BoardConfig, BoardService, MemoryBoardService};
use broadside_match::{MatchConfig, MatchDirectory, MatchObserver, TracingObserver};
use serde::{Deserialize, Serialize};

/// All settings in one serializable struct, e.g. for loading from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadsideConfig {
    pub matches: MatchConfig,
    pub boards: BoardConfig,
}

/// Entry point for setting up Broadside.
///
/// # Example
///
/// ```rust
/// use broadside::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let directory = Broadside::builder()
///     .call_timeout(std::time::Duration::from_secs(2))
///     .build(MemoryBoardService::new(BoardConfig::default()));
/// assert_eq!(directory.match_count(), 0);
/// # }
/// ```
pub struct Broadside;

impl Broadside {
    /// Creates a new builder.
    pub fn builder() -> BroadsideBuilder {
        BroadsideBuilder::new()
    }

    /// Builds a directory backed by in-memory boards, all from one config.
    pub fn from_config(config: BroadsideConfig) -> MatchDirectory {
        Self::builder()
            .config(config.matches)
            .build(MemoryBoardService::new(config.boards))
    }
}

/// Builder for a [`MatchDirectory`].
pub struct BroadsideBuilder {
    config: MatchConfig,
    observer: Arc<dyn MatchObserver>,
}

impl BroadsideBuilder {
    /// Creates a builder with default settings and a [`TracingObserver`].
    pub fn new() -> Self {
        Self {
            config: MatchConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the whole match configuration.
    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how long each call to a match may take.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Sets the lifecycle observer.
    pub fn observer(mut self, observer: impl MatchObserver) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Builds the directory on top of `boards`.
    pub fn build(self, boards: impl BoardService) -> MatchDirectory {
        MatchDirectory::with_observer(Arc::new(boards), self.observer, self.config)
    }
}

impl Default for BroadsideBuilder {
    fn default() -> Self {
        Self::new()
    }
}
