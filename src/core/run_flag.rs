//! # Cooperative `running` flag.
//!
//! [`RunFlag`] is the shared pause/resume cell read by the arrival loop and by
//! every vehicle before each entry attempt. It is a state cell, not an
//! interrupt: clearing it never aborts a sleep already in flight.
//!
//! ```text
//! start() ──► true ──┐
//!                    ├──► watch channel ──► wait_running() resolves
//! stop()  ──► false ─┘                      (or returns false on shutdown)
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shared pause/resume flag (cheap to clone).
#[derive(Clone, Debug)]
pub struct RunFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl RunFlag {
    /// Creates a flag in the given state.
    pub fn new(running: bool) -> Self {
        let (tx, _rx) = watch::channel(running);
        Self { tx: Arc::new(tx) }
    }

    /// Sets the flag. Returns the previous state.
    pub fn start(&self) -> bool {
        self.tx.send_replace(true)
    }

    /// Clears the flag. Returns the previous state.
    pub fn stop(&self) -> bool {
        self.tx.send_replace(false)
    }

    /// Current state.
    pub fn is_running(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is set.
    ///
    /// Returns `false` if `token` is cancelled first; `true` otherwise.
    /// Returns immediately when already running.
    pub async fn wait_running(&self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        let mut rx = self.tx.subscribe();
        tokio::select! {
            res = rx.wait_for(|running| *running) => res.is_ok(),
            _ = token.cancelled() => false,
        }
    }
}
