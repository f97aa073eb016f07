//! Fixed-window call limiter for the upstream provider.
//!
//! Counts upstream calls in the current window. When the window has
//! elapsed the counter drops back to zero and a new window starts at the
//! instant of observation. No call is admitted while the counter is at the
//! configured maximum.
//!
//! Because a fresh window can open right after a burst at the end of the
//! previous one, the limiter also keeps the instants of the last
//! `max_calls` admissions and refuses a call until the oldest of them is a
//! full window old. Any sliding window therefore holds at most `max_calls`
//! calls, whatever the dispatch spacing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use super::clock::Clock;

/// Outcome of an admission request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    /// The call may proceed now; it has been counted.
    Granted,
    /// The window is exhausted; retry after the given duration.
    Deferred(Duration),
}

#[derive(Debug)]
struct WindowState {
    /// Calls admitted in the current window.
    count: u32,
    /// Start of the current window.
    window_start: Instant,
    /// Instants of the most recent admissions, oldest first, at most
    /// `max_calls` long.
    recent: VecDeque<Instant>,
}

/// Fixed-window rate limiter.
///
/// Single-writer in practice (the dispatch worker), but guarded by a mutex
/// so the health endpoint can read counters concurrently.
pub struct WindowLimiter {
    state: Mutex<WindowState>,
    max_calls: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl WindowLimiter {
    /// Create a limiter admitting `max_calls` per `window`.
    pub fn new(max_calls: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            state: Mutex::new(WindowState {
                count: 0,
                window_start,
                recent: VecDeque::with_capacity(max_calls as usize),
            }),
            max_calls,
            window,
            clock,
        }
    }

    /// Lock the state mutex, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Window limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Try to admit one upstream call now.
    pub fn try_admit(&self) -> Admission {
        let now = self.clock.now();
        let mut state = self.lock_state();

        let mut age = now.saturating_duration_since(state.window_start);
        if age >= self.window {
            state.count = 0;
            state.window_start = now;
            age = Duration::ZERO;
        }

        if state.count >= self.max_calls {
            return Admission::Deferred(self.window - age);
        }

        if state.recent.len() >= self.max_calls as usize {
            if let Some(&oldest) = state.recent.front() {
                let since = now.saturating_duration_since(oldest);
                if since < self.window {
                    return Admission::Deferred(self.window - since);
                }
            }
        }

        state.count += 1;
        state.recent.push_back(now);
        while state.recent.len() > self.max_calls as usize {
            state.recent.pop_front();
        }
        debug!(
            "Window limiter: admitted call {}/{}",
            state.count, self.max_calls
        );
        Admission::Granted
    }

    /// Wait (asynchronously) until a call is admitted.
    pub async fn acquire(&self) {
        loop {
            match self.try_admit() {
                Admission::Granted => return,
                Admission::Deferred(wait) => {
                    debug!("Window limiter: window exhausted, waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Calls admitted in the current window, without starting a new one.
    pub fn calls_in_window(&self) -> u32 {
        let now = self.clock.now();
        let state = self.lock_state();
        if now.saturating_duration_since(state.window_start) >= self.window {
            0
        } else {
            state.count
        }
    }

    /// Configured maximum calls per window.
    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}
