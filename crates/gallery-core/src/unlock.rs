//! Unlock countdown and reward balance.
//!
//! [`UnlockMachine`] holds the pure transitions; [`UnlockController`] drives
//! it with a one-second timer and applies completed unlocks to an
//! [`UnlockTarget`] (the gallery list).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant};

use crate::models::ItemId;
use crate::subscription::Subscription;

/// Length of the simulated ad, in ticks.
pub const UNLOCK_COUNTDOWN_SECS: u32 = 5;
/// Coins credited per completed countdown.
pub const UNLOCK_REWARD: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    #[error("item {0} is not in the gallery")]
    UnknownItem(ItemId),
    #[error("item {0} is already unlocked")]
    AlreadyUnlocked(ItemId),
    #[error("unlock controller has been disposed")]
    Disposed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUnlock {
    pub target_id: ItemId,
    pub remaining_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockPhase {
    Idle,
    Counting(PendingUnlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was counting.
    Idle,
    /// Still counting; seconds left.
    Counting(u32),
    /// The countdown finished and the reward was credited.
    Completed(ItemId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockMachine {
    pending: Option<PendingUnlock>,
    balance: u64,
    generation: u64,
}

impl UnlockMachine {
    /// Start counting down for `target_id`, abandoning any countdown already
    /// in flight. Returns the generation that identifies this countdown.
    pub fn begin(&mut self, target_id: ItemId) -> u64 {
        if let Some(previous) = self.pending.take() {
            tracing::debug!(
                "Abandoning unlock of {} with {}s left",
                previous.target_id,
                previous.remaining_seconds
            );
        }
        self.generation += 1;
        self.pending = Some(PendingUnlock {
            target_id,
            remaining_seconds: UNLOCK_COUNTDOWN_SECS,
        });
        self.generation
    }

    pub fn tick(&mut self) -> TickOutcome {
        let Some(pending) = self.pending.as_mut() else {
            return TickOutcome::Idle;
        };
        pending.remaining_seconds = pending.remaining_seconds.saturating_sub(1);
        if pending.remaining_seconds > 0 {
            return TickOutcome::Counting(pending.remaining_seconds);
        }

        let Some(completed) = self.pending.take() else {
            return TickOutcome::Idle;
        };
        self.balance += UNLOCK_REWARD;
        TickOutcome::Completed(completed.target_id)
    }

    /// Drop the in-flight countdown without reward.
    pub fn abandon(&mut self) -> Option<PendingUnlock> {
        self.generation += 1;
        self.pending.take()
    }

    pub fn phase(&self) -> UnlockPhase {
        self.pending
            .clone()
            .map_or(UnlockPhase::Idle, UnlockPhase::Counting)
    }

    pub const fn pending(&self) -> Option<&PendingUnlock> {
        self.pending.as_ref()
    }

    pub const fn balance(&self) -> u64 {
        self.balance
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// The list a completed countdown unlocks an item in.
pub trait UnlockTarget: Clone + Send + Sync + 'static {
    /// `None` when the item is not listed, otherwise its unlock flag.
    fn lock_state(&self, id: &ItemId) -> Option<bool>;

    /// Flip the item's flag. Returns `false` when the item has gone.
    fn mark_unlocked(&self, id: &ItemId) -> bool;
}

pub struct UnlockController<T> {
    target: T,
    machine: Arc<watch::Sender<UnlockMachine>>,
    timer: Subscription,
    tick_period: Duration,
    disposed: AtomicBool,
}

impl<T: UnlockTarget> UnlockController<T> {
    pub fn new(target: T) -> Self {
        Self::with_tick_period(target, Duration::from_secs(1))
    }

    pub fn with_tick_period(target: T, tick_period: Duration) -> Self {
        let (machine, _) = watch::channel(UnlockMachine::default());
        Self {
            target,
            machine: Arc::new(machine),
            timer: Subscription::default(),
            tick_period,
            disposed: AtomicBool::new(false),
        }
    }

    /// Start the countdown for `id`, replacing any countdown in flight.
    ///
    /// Unknown and already unlocked items are rejected.
    pub fn request_unlock(&self, id: &ItemId) -> Result<(), UnlockError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(UnlockError::Disposed);
        }
        match self.target.lock_state(id) {
            None => return Err(UnlockError::UnknownItem(id.clone())),
            Some(true) => return Err(UnlockError::AlreadyUnlocked(id.clone())),
            Some(false) => {}
        }

        let mut generation = 0;
        self.machine
            .send_modify(|machine| generation = machine.begin(id.clone()));
        tracing::info!("Unlock countdown started for {}", id);

        self.timer.replace(run_countdown(
            self.target.clone(),
            Arc::clone(&self.machine),
            generation,
            self.tick_period,
        ));
        Ok(())
    }

    /// Cancel the timer. Nothing changes after this returns.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.timer.cancel();
        self.machine.send_modify(|machine| {
            machine.abandon();
        });
    }

    pub fn status(&self) -> UnlockMachine {
        self.machine.borrow().clone()
    }

    pub fn reward_balance(&self) -> u64 {
        self.machine.borrow().balance()
    }

    pub fn watch(&self) -> watch::Receiver<UnlockMachine> {
        self.machine.subscribe()
    }
}

async fn run_countdown<T: UnlockTarget>(
    target: T,
    machine: Arc<watch::Sender<UnlockMachine>>,
    generation: u64,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;

        let mut outcome = TickOutcome::Idle;
        machine.send_if_modified(|machine| {
            if machine.generation() != generation {
                return false;
            }
            outcome = machine.tick();
            outcome != TickOutcome::Idle
        });

        match outcome {
            TickOutcome::Idle => return,
            TickOutcome::Counting(remaining) => tracing::debug!("Unlock tick: {}s left", remaining),
            TickOutcome::Completed(id) => {
                if target.mark_unlocked(&id) {
                    tracing::info!("Unlocked {} (+{} coins)", id, UNLOCK_REWARD);
                } else {
                    tracing::debug!("Unlocked item {} is no longer listed", id);
                }
                return;
            }
        }
    }
}
