//! Cancellable handles for long-lived background tasks.
//!
//! Identity listeners, gallery feeds, and countdown timers all run as tokio
//! tasks owned by a [`Subscription`]. Cancelling is idempotent, and dropping
//! the handle cancels the task, so a disposed owner can never be called back.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;

/// Owner of at most one running background task.
#[derive(Debug, Default)]
pub struct Subscription {
    handle: Mutex<Option<AbortHandle>>,
}

impl Subscription {
    /// Spawn `future` and return the handle that owns it.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let subscription = Self::default();
        subscription.replace(future);
        subscription
    }

    /// Cancel whatever task is currently owned and spawn `future` in its place.
    pub fn replace<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(tokio::spawn(future).abort_handle());
    }

    /// Cancel the owned task. Returns `false` when nothing was owned.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a task is owned and has not finished yet.
    pub fn is_active(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
