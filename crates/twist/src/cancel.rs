//! Cooperative cancellation.
//!
//! A [`Cancellation`] is handed to every API call. Waiting on the network,
//! reading a body and sleeping between retries all race against
//! [`Cancellation::cancelled`], so a cancelled operation stops at the next
//! await point with [`crate::Error::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a cancellation signal.
pub type SharedCancellation = Arc<Cancellation>;

#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Cancellation {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    pub fn shared() -> SharedCancellation {
        Arc::new(Self::new())
    }

    /// Request cancellation. Wakes every waiter; later calls are no-ops.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested. Returns immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent `cancel` cannot
        // slip between the check and the wait.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Cancel when the process receives Ctrl-C.
    pub fn cancel_on_ctrl_c(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupted, cancelling in-flight requests");
                this.cancel();
            }
        });
    }
}
