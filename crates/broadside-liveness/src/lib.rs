//! Liveness signals for Broadside.
//!
//! A match depends on peers it does not own: the two player connections and
//! the two boards. Each such peer holds a [`Lifeline`]; anyone interested in
//! its death holds a [`Liveness`]. When the lifeline is cut (explicitly or by
//! being dropped), every `Liveness` watching it observes termination exactly
//! once.
//!
//! ```text
//! peer task ── owns ──> Lifeline ──(cut / drop)──> Liveness::terminated()
//!                                                      │
//!                                 Liveness::watch() ───┴──> signal into an actor inbox
//! ```
//!
//! Built on `tokio::sync::watch`: the flag only ever moves from "alive" to
//! "dead", and a dropped sender counts as dead.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// The owning end of a liveness signal. Held by the monitored peer.
///
/// Dropping it is the same as calling [`cut`](Self::cut), so a peer that
/// panics or simply goes out of scope is reported as terminated.
#[derive(Debug)]
pub struct Lifeline {
    tx: watch::Sender<bool>,
}

impl Lifeline {
    /// Creates a lifeline and a first watcher for it.
    pub fn new() -> (Self, Liveness) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, Liveness { rx })
    }

    /// Returns another watcher for this lifeline.
    pub fn liveness(&self) -> Liveness {
        Liveness {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live watchers.
    pub fn watchers(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Terminates the peer. All watchers are notified.
    pub fn cut(self) {
        // Ignore the error: no watchers left means nobody to tell.
        let _ = self.tx.send(true);
    }
}

/// The watching end of a liveness signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Liveness {
    rx: watch::Receiver<bool>,
}

impl Liveness {
    /// Returns `true` once the peer has terminated.
    pub fn is_terminated(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves when the peer terminates. Resolves immediately if it
    /// already has.
    pub async fn terminated(&mut self) {
        // `Err` means the lifeline was dropped, which is termination too.
        let _ = self.rx.wait_for(|dead| *dead).await;
    }

    /// Spawns a watcher that delivers `signal` into `inbox` when the peer
    /// terminates.
    ///
    /// The watcher exits quietly once the inbox's receiver is gone, so an
    /// actor that stops for another reason doesn't leave watchers behind.
    pub fn watch<T>(mut self, inbox: mpsc::UnboundedSender<T>, signal: T) -> JoinHandle<()>
    where
        T: Send + 'static,
    {
        tokio::spawn(async move {
            tokio::select! {
                _ = self.terminated() => {
                    if inbox.send(signal).is_err() {
                        tracing::trace!("liveness signal dropped, inbox closed");
                    }
                }
                _ = inbox.closed() => {}
            }
        })
    }
}
