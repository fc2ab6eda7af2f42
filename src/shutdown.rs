//! Graceful shutdown for the fetch pipeline.
//!
//! A [`StopSignal`] is a cheap cloneable one-way flag shared between the
//! Ctrl+C handler, the schedule loop, and the post loop. Sleeps are not
//! interrupted; the fetch loop polls the flag between units, so the current
//! unit always finishes and exports stay consistent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

/// One-way stop flag. Clones observe the same underlying signal.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the signal. Idempotent; waiters are notified on the first call.
    pub fn trigger(&self) {
        if !self.inner.stopped.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether the signal has been tripped.
    pub fn is_triggered(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Wait until the signal trips. Returns immediately if already tripped.
    pub async fn triggered(&self) {
        if self.is_triggered() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Spawn a task that trips this signal on the first Ctrl+C.
    pub fn trip_on_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, finishing the current unit then stopping");
                signal.trigger();
            }
        });
    }
}
