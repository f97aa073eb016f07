//! Monotonic time source shared by the limiter and the quote cache.
//!
//! Built on [`tokio::time::Instant`] so that paused-time tests drive
//! window resets and cache ageing together with `tokio::time::sleep`.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::warn;
use tokio::time::Instant;

/// Provider of the current monotonic instant.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> Instant;
}

/// Clock backed by the Tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Start at the current Tokio instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    fn lock_now(&self) -> MutexGuard<'_, Instant> {
        self.now.lock().unwrap_or_else(|poisoned| {
            warn!("Manual clock mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock_now();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.lock_now()
    }
}
