//! Match directory: starts match actors and resolves them by id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use broadside_board::BoardService;
use broadside_protocol::{
    MatchId, MatchReply, MatchRequest, MatchView, PlayerId, PlayerView,
};

use crate::actor::{Registry, spawn_match};
use crate::{
    ConnectionHandle, MatchConfig, MatchError, MatchHandle, MatchObserver,
    TracingObserver,
};

/// Knows every running match and routes calls to it by id.
///
/// Cloning is cheap and every clone sees the same matches. At most one
/// actor runs per id; a match that terminates removes itself, after which
/// its id can be started again.
///
/// Every call addressed to an id with no running match returns
/// [`MatchError::GameDoesNotExist`].
#[derive(Clone)]
pub struct MatchDirectory {
    matches: Registry,
    boards: Arc<dyn BoardService>,
    observer: Arc<dyn MatchObserver>,
    config: MatchConfig,
    next_id: Arc<AtomicU64>,
}

impl MatchDirectory {
    /// Creates an empty directory whose matches use `boards` and log
    /// lifecycle events through [`TracingObserver`].
    pub fn new(boards: Arc<dyn BoardService>, config: MatchConfig) -> Self {
        Self::with_observer(boards, Arc::new(TracingObserver), config)
    }

    /// Creates an empty directory with a custom lifecycle observer.
    pub fn with_observer(
        boards: Arc<dyn BoardService>,
        observer: Arc<dyn MatchObserver>,
        config: MatchConfig,
    ) -> Self {
        Self {
            matches: Arc::new(Mutex::new(HashMap::new())),
            boards,
            observer,
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Starts a match actor under `match_id`.
    ///
    /// # Errors
    /// [`MatchError::AlreadyExists`] if a match with this id is running.
    pub fn start(&self, match_id: MatchId) -> Result<MatchHandle, MatchError> {
        let mut matches = self.lock();
        if matches.contains_key(&match_id) {
            return Err(MatchError::AlreadyExists(match_id));
        }
        // Spawning under the lock keeps check-and-insert atomic.
        let handle = spawn_match(
            match_id,
            &self.config,
            Arc::clone(&self.boards),
            Arc::clone(&self.observer),
            &self.matches,
        );
        matches.insert(match_id, handle.clone());
        tracing::debug!(%match_id, matches = matches.len(), "match registered");
        Ok(handle)
    }

    /// Starts a match under a fresh id and returns the id.
    pub fn create(&self) -> MatchId {
        loop {
            let match_id = MatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
            // Ids picked by callers through `start` may already be taken.
            if self.start(match_id).is_ok() {
                return match_id;
            }
        }
    }

    /// Looks up the running match with this id.
    pub fn resolve(&self, match_id: MatchId) -> Result<MatchHandle, MatchError> {
        self.lock()
            .get(&match_id)
            .filter(|handle| handle.is_running())
            .cloned()
            .ok_or(MatchError::GameDoesNotExist(match_id))
    }

    /// Returns `true` if a match with this id is running.
    pub fn contains(&self, match_id: MatchId) -> bool {
        self.resolve(match_id).is_ok()
    }

    /// Number of registered matches.
    pub fn match_count(&self) -> usize {
        self.lock().len()
    }

    /// Lists all registered match ids.
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.lock().keys().copied().collect()
    }

    // -----------------------------------------------------------------------
    // Calls by id
    // -----------------------------------------------------------------------

    /// Seats `player_id` in match `match_id`.
    pub async fn join(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        connection: ConnectionHandle,
    ) -> Result<MatchHandle, MatchError> {
        self.resolve(match_id)?
            .join(player_id, connection)
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    pub async fn get_data(&self, match_id: MatchId) -> Result<MatchView, MatchError> {
        self.resolve(match_id)?
            .get_data()
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    pub async fn get_player_data(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<PlayerView, MatchError> {
        self.resolve(match_id)?
            .get_player_data(player_id)
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    pub async fn add_message(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        text: impl Into<String>,
    ) -> Result<MatchView, MatchError> {
        self.resolve(match_id)?
            .add_message(player_id, text)
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    pub async fn player_shot(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<MatchView, MatchError> {
        self.resolve(match_id)?
            .player_shot(player_id, x, y)
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    pub async fn player_left(
        &self,
        match_id: MatchId,
        player_id: PlayerId,
    ) -> Result<MatchView, MatchError> {
        self.resolve(match_id)?
            .player_left(player_id)
            .await
            .map_err(|e| e.or_gone(match_id))
    }

    /// Serves a wire-level request. Errors become [`MatchReply::Error`].
    pub async fn dispatch(&self, match_id: MatchId, request: MatchRequest) -> MatchReply {
        let operation = request.name();
        let result = match self.resolve(match_id) {
            Err(e) => Err(e),
            Ok(handle) => match request {
                MatchRequest::GetData => handle.get_data().await.map(MatchReply::Game),
                MatchRequest::GetPlayerData { player_id } => handle
                    .get_player_data(player_id)
                    .await
                    .map(MatchReply::Player),
                MatchRequest::AddMessage { player_id, text } => handle
                    .add_message(player_id, text)
                    .await
                    .map(MatchReply::Game),
                MatchRequest::PlayerShot { player_id, x, y } => handle
                    .player_shot(player_id, x, y)
                    .await
                    .map(MatchReply::Game),
                MatchRequest::PlayerLeft { player_id } => handle
                    .player_left(player_id)
                    .await
                    .map(MatchReply::Game),
                MatchRequest::Unsupported => {
                    handle.unsupported(operation).await.map(MatchReply::Game)
                }
            },
        };

        result.unwrap_or_else(|e| {
            let e = e.or_gone(match_id);
            tracing::debug!(%match_id, operation, error = %e, "request failed");
            MatchReply::Error {
                reason: e.to_string(),
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MatchId, MatchHandle>> {
        self.matches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
