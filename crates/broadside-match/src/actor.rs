//! Match actor: an isolated Tokio task that owns one match.
//!
//! The actor has two inboxes. Requests from callers arrive on a bounded
//! `mpsc` channel, each with a `oneshot` reply channel. Termination signals
//! from watched peers (connections and boards) arrive on a second channel
//! that is always polled first, so a dead peer preempts anything still
//! queued.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use broadside_board::{BoardError, BoardService};
use broadside_protocol::{
    ConnectionId, MatchId, MatchView, PlayerId, PlayerView, Turn,
};
use tokio::sync::{mpsc, oneshot};

use crate::session::{Admission, ConnectionHandle, MatchSession};
use crate::{MatchConfig, MatchError, MatchObserver};

/// Directory entries, shared with each actor so it can deregister itself.
pub(crate) type Registry = Arc<Mutex<HashMap<MatchId, MatchHandle>>>;

/// Commands sent to a match actor through its channel.
pub(crate) enum MatchCommand {
    Join {
        player_id: PlayerId,
        connection: ConnectionHandle,
        reply: oneshot::Sender<Result<(), MatchError>>,
    },
    GetData {
        reply: oneshot::Sender<MatchView>,
    },
    GetPlayerData {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<PlayerView, MatchError>>,
    },
    AddMessage {
        player_id: PlayerId,
        text: String,
        reply: oneshot::Sender<Result<MatchView, MatchError>>,
    },
    PlayerShot {
        player_id: PlayerId,
        x: u8,
        y: u8,
        reply: oneshot::Sender<Result<MatchView, MatchError>>,
    },
    PlayerLeft {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<MatchView, MatchError>>,
    },
    /// A request the transport could decode but the match doesn't handle.
    Unsupported {
        operation: String,
        reply: oneshot::Sender<MatchError>,
    },
}

/// A watched peer that terminated.
#[derive(Debug, Clone, Copy)]
enum PeerDown {
    Connection {
        connection_id: ConnectionId,
        player_id: PlayerId,
    },
    Board {
        player_id: PlayerId,
    },
}

impl std::fmt::Display for PeerDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection {
                connection_id,
                player_id,
            } => write!(f, "connection {connection_id} of {player_id}"),
            Self::Board { player_id } => write!(f, "board of {player_id}"),
        }
    }
}

/// Handle to a running match actor.
///
/// Cheap to clone: it's an `mpsc::Sender` plus the call timeout. Every
/// call waits at most `call_timeout` for its reply.
#[derive(Clone)]
pub struct MatchHandle {
    match_id: MatchId,
    sender: mpsc::Sender<MatchCommand>,
    call_timeout: Duration,
}

impl std::fmt::Debug for MatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchHandle")
            .field("match_id", &self.match_id)
            .finish_non_exhaustive()
    }
}

impl MatchHandle {
    /// Returns the match's id.
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Returns `true` while the actor behind this handle is running.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Returns `true` if both handles address the same actor.
    pub fn same_match(&self, other: &MatchHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Seats `player_id`, or confirms it is already seated.
    ///
    /// On success returns a handle to this match.
    pub async fn join(
        &self,
        player_id: PlayerId,
        connection: ConnectionHandle,
    ) -> Result<MatchHandle, MatchError> {
        self.call(|reply| MatchCommand::Join {
            player_id,
            connection,
            reply,
        })
        .await??;
        Ok(self.clone())
    }

    /// Snapshot of the match, without connections.
    pub async fn get_data(&self) -> Result<MatchView, MatchError> {
        self.call(|reply| MatchCommand::GetData { reply }).await
    }

    /// Snapshot of the match from `player_id`'s seat, with their own full
    /// board and the opponent's masked board.
    pub async fn get_player_data(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerView, MatchError> {
        self.call(|reply| MatchCommand::GetPlayerData { player_id, reply })
            .await?
    }

    /// Posts a chat line.
    pub async fn add_message(
        &self,
        player_id: PlayerId,
        text: impl Into<String>,
    ) -> Result<MatchView, MatchError> {
        let text = text.into();
        self.call(|reply| MatchCommand::AddMessage {
            player_id,
            text,
            reply,
        })
        .await?
    }

    /// Fires at `(x, y)` on the opponent's board.
    pub async fn player_shot(
        &self,
        player_id: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<MatchView, MatchError> {
        self.call(|reply| MatchCommand::PlayerShot {
            player_id,
            x,
            y,
            reply,
        })
        .await?
    }

    /// Records that `player_id` left. The match keeps running.
    pub async fn player_left(
        &self,
        player_id: PlayerId,
    ) -> Result<MatchView, MatchError> {
        self.call(|reply| MatchCommand::PlayerLeft { player_id, reply })
            .await?
    }

    /// Hands the match a request it has no handler for. Always an error.
    pub async fn unsupported(
        &self,
        operation: impl Into<String>,
    ) -> Result<MatchView, MatchError> {
        let operation = operation.into();
        let err = self
            .call(|reply| MatchCommand::Unsupported { operation, reply })
            .await?;
        Err(err)
    }

    /// Sends one command and waits for its reply, bounded by the call
    /// timeout.
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> MatchCommand,
    ) -> Result<T, MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(command(reply_tx))
                .await
                .map_err(|_| MatchError::Unavailable(self.match_id))?;
            reply_rx
                .await
                .map_err(|_| MatchError::Unavailable(self.match_id))
        };
        tokio::time::timeout(self.call_timeout, exchange)
            .await
            .map_err(|_| MatchError::Timeout(self.match_id))?
    }
}

/// The internal match actor state. Runs inside a Tokio task.
struct MatchActor {
    session: MatchSession,
    boards: Arc<dyn BoardService>,
    observer: Arc<dyn MatchObserver>,
    /// Weak so that dropping the directory lets idle actors wind down.
    registry: Weak<Mutex<HashMap<MatchId, MatchHandle>>>,
    receiver: mpsc::Receiver<MatchCommand>,
    /// Handed to liveness watchers; kept here so the signal channel stays
    /// open for the actor's whole life.
    signal_tx: mpsc::UnboundedSender<PeerDown>,
    signals: mpsc::UnboundedReceiver<PeerDown>,
}

impl MatchActor {
    fn id(&self) -> MatchId {
        self.session.id()
    }

    /// Runs the actor loop until a watched peer dies or every handle is
    /// dropped.
    async fn run(mut self) {
        let match_id = self.id();
        tracing::info!(%match_id, "match actor started");
        self.notify(|o| o.created(match_id));

        loop {
            tokio::select! {
                biased;

                Some(peer) = self.signals.recv() => {
                    tracing::warn!(%match_id, %peer, "watched peer terminated");
                    break;
                }
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd).await,
                    None => {
                        tracing::info!(%match_id, "all handles dropped");
                        break;
                    }
                },
            }
        }

        self.terminate().await;
        tracing::info!(%match_id, phase = %self.session.phase(), "match actor stopped");
    }

    async fn handle(&mut self, cmd: MatchCommand) {
        match cmd {
            MatchCommand::Join {
                player_id,
                connection,
                reply,
            } => {
                let result = self.handle_join(player_id, connection).await;
                self.reply(reply, result);
            }
            MatchCommand::GetData { reply } => {
                self.reply(reply, self.session.view());
            }
            MatchCommand::GetPlayerData { player_id, reply } => {
                let result = self.handle_player_data(player_id).await;
                self.reply(reply, result);
            }
            MatchCommand::AddMessage {
                player_id,
                text,
                reply,
            } => {
                let result = self
                    .session
                    .add_message(player_id, text)
                    .map(|()| self.session.view());
                self.reply(reply, result);
            }
            MatchCommand::PlayerShot {
                player_id,
                x,
                y,
                reply,
            } => {
                let result = self.handle_shot(player_id, x, y).await;
                self.reply(reply, result);
            }
            MatchCommand::PlayerLeft { player_id, reply } => {
                let result = self.handle_leave(player_id);
                self.reply(reply, result);
            }
            MatchCommand::Unsupported { operation, reply } => {
                tracing::warn!(match_id = %self.id(), %operation, "unsupported request");
                self.reply(reply, MatchError::Unsupported(operation));
            }
        }
    }

    async fn handle_join(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionHandle,
    ) -> Result<(), MatchError> {
        let seat = match self.session.admit(player_id)? {
            Admission::Rejoin => {
                tracing::debug!(match_id = %self.id(), %player_id, "player rejoined");
                return Ok(());
            }
            Admission::Seat(seat) => seat,
        };

        let board = self.board(move |b| b.create(player_id)).await?;

        let connection_id = connection.id;
        connection.liveness.clone().watch(
            self.signal_tx.clone(),
            PeerDown::Connection {
                connection_id,
                player_id,
            },
        );
        board
            .liveness
            .watch(self.signal_tx.clone(), PeerDown::Board { player_id });

        self.session.seat(seat, player_id, connection)?;
        tracing::info!(
            match_id = %self.id(),
            %player_id,
            %connection_id,
            ?seat,
            "player seated"
        );
        let match_id = self.id();
        self.notify(|o| o.player_joined(match_id, player_id));
        Ok(())
    }

    async fn handle_player_data(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerView, MatchError> {
        let opponent = self.session.opponent_of(player_id)?;
        let (my_board, opponents_board) = self
            .board(move |b| {
                let mine = b.get_data(player_id)?;
                let theirs = opponent
                    .map(|opponent| b.get_opponents_data(opponent))
                    .transpose()?;
                Ok((mine, theirs))
            })
            .await?;

        Ok(PlayerView {
            game: self.session.view(),
            my_board,
            opponents_board,
        })
    }

    async fn handle_shot(
        &mut self,
        player_id: PlayerId,
        x: u8,
        y: u8,
    ) -> Result<MatchView, MatchError> {
        let opponent = self
            .session
            .opponent_of(player_id)?
            .ok_or(MatchError::NoOpponent(player_id))?;

        let result = self
            .board(move |b| b.take_shot(opponent, x, y))
            .await?;
        let turn = Turn {
            player_id,
            x,
            y,
            result,
        };
        self.session.record_turn(turn.clone());
        tracing::debug!(match_id = %self.id(), %player_id, x, y, %result, "shot resolved");

        // The turn stands even if hit points can't be read; the next shot
        // evaluates again.
        if let Err(e) = self.evaluate_win().await {
            tracing::warn!(match_id = %self.id(), error = %e, "win evaluation failed");
        }

        let match_id = self.id();
        self.notify(|o| o.player_shot(match_id, &turn));
        Ok(self.session.view())
    }

    /// Reads both boards' hit points and lets the session decide.
    async fn evaluate_win(&mut self) -> Result<(), MatchError> {
        if self.session.winner().is_some() {
            return Ok(());
        }
        let (Some(attacker), Some(defender)) =
            (self.session.attacker(), self.session.defender())
        else {
            return Ok(());
        };

        let (attacker_hp, defender_hp) = self
            .board(move |b| {
                Ok((
                    b.get_data(attacker)?.hit_points,
                    b.get_data(defender)?.hit_points,
                ))
            })
            .await?;
        if let Some(winner) = self.session.evaluate_win(attacker_hp, defender_hp) {
            tracing::info!(match_id = %self.id(), %winner, "fleet destroyed, winner declared");
        }
        Ok(())
    }

    fn handle_leave(
        &mut self,
        player_id: PlayerId,
    ) -> Result<MatchView, MatchError> {
        self.session.leave(player_id)?;
        tracing::info!(
            match_id = %self.id(),
            %player_id,
            winner = ?self.session.winner(),
            "player left"
        );
        Ok(self.session.view())
    }

    /// Stops the match: releases both boards, deregisters, and reports.
    ///
    /// Runs once, after the loop has exited.
    async fn terminate(&mut self) {
        let match_id = self.id();
        self.receiver.close();

        let players: Vec<PlayerId> = self.session.players().collect();
        for player_id in players {
            if let Err(e) = self.board(move |b| b.destroy(player_id)).await {
                tracing::warn!(%match_id, %player_id, error = %e, "board release failed");
            }
        }
        self.session.mark_terminated();

        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Our receiver is closed, so our own entry is the one whose
            // sender reports closed.
            if registry
                .get(&match_id)
                .is_some_and(|handle| handle.sender.is_closed())
            {
                registry.remove(&match_id);
            }
        }

        let winner = self.session.winner();
        self.notify(|o| o.stopped(match_id));
        self.notify(|o| o.over(match_id, winner));
    }

    /// Runs a board call on the blocking pool.
    ///
    /// A slow board never stalls a runtime thread. The actor still awaits
    /// the result, so requests to this match stay serialized.
    async fn board<T, F>(&self, call: F) -> Result<T, MatchError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn BoardService) -> Result<T, BoardError> + Send + 'static,
    {
        let boards = Arc::clone(&self.boards);
        let result = tokio::task::spawn_blocking(move || call(boards.as_ref()))
            .await
            .map_err(|e| {
                tracing::error!(match_id = %self.id(), error = %e, "board call panicked");
                BoardError::Unavailable
            })?;
        Ok(result?)
    }

    /// Sends a reply. A caller that gave up (timeout, dropped future) is
    /// not an error for the match.
    fn reply<T>(&self, reply: oneshot::Sender<T>, value: T) {
        if reply.send(value).is_err() {
            tracing::debug!(match_id = %self.id(), "caller went away before reply");
        }
    }

    /// Invokes the observer, containing any panic.
    fn notify(&self, event: impl FnOnce(&dyn MatchObserver)) {
        let observer = self.observer.as_ref();
        if catch_unwind(AssertUnwindSafe(|| event(observer))).is_err() {
            tracing::warn!(match_id = %self.id(), "observer panicked, event dropped");
        }
    }
}

/// Spawns a new match actor task and returns a handle to it.
///
/// The caller is responsible for inserting the handle into `registry`;
/// the actor removes it again when it stops.
pub(crate) fn spawn_match(
    match_id: MatchId,
    config: &MatchConfig,
    boards: Arc<dyn BoardService>,
    observer: Arc<dyn MatchObserver>,
    registry: &Registry,
) -> MatchHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (signal_tx, signals) = mpsc::unbounded_channel();

    let actor = MatchActor {
        session: MatchSession::new(match_id),
        boards,
        observer,
        registry: Arc::downgrade(registry),
        receiver: rx,
        signal_tx,
        signals,
    };

    tokio::spawn(actor.run());

    MatchHandle {
        match_id,
        sender: tx,
        call_timeout: config.call_timeout,
    }
}
