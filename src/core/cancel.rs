//! Cancellation token for reconciliation passes.
//!
//! The token is set from a ctrl-c handler in `main` and checked by the
//! reconciler between releases and by the download engine between chunks
//! and attempts, so an interrupt takes the same cleanup path as an
//! exhausted retry instead of relying on an OS-level signal handler around
//! a single call.

use crate::core::{MirrorError, MirrorResult};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; wakes any task in [`cancelled`].
    ///
    /// [`cancelled`]: CancelToken::cancelled
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Returns `Err(Interrupted)` once cancellation has been requested.
    pub fn check(&self) -> MirrorResult<()> {
        if self.is_cancelled() {
            Err(MirrorError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Resolves once cancellation has been requested. Usable in `select!`
    /// against sleeps or other long waits.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
