//! Bounded FIFO of pending upstream fetches, drained by a single worker.
//!
//! The worker pops the head entry, waits for admission from the
//! [`WindowLimiter`], performs the upstream call under a per-call timeout,
//! hands the outcome to the entry's settle callback and then sleeps for the
//! inter-request interval, even after an error. It stops when it finds the
//! queue empty and is started again by the next enqueue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::Instant;

use super::window_limiter::WindowLimiter;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Default maximum number of pending entries.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 50;

/// Default per-call upstream timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Completion callback invoked exactly once with the fetch outcome.
pub type SettleFn = Box<dyn FnOnce(Result<Quote, MarketDataError>) + Send + 'static>;

/// Dispatch queue configuration.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Enqueue fails with `QueueFull` once this many entries are pending.
    pub max_queue_size: usize,
    /// Fixed pause after every upstream call.
    pub request_interval: Duration,
    /// Per-call upstream timeout.
    pub upstream_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            request_interval: Duration::from_secs(12),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

struct QueueEntry {
    symbol: String,
    on_settle: SettleFn,
    enqueued_at: Instant,
}

#[derive(Default)]
struct QueueState {
    entries: VecDeque<QueueEntry>,
    worker_running: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    provider: Arc<dyn QuoteProvider>,
    limiter: Arc<WindowLimiter>,
    config: DispatchConfig,
}

impl QueueInner {
    /// Lock the queue state, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Dispatch queue mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// Bounded FIFO dispatch queue in front of a [`QuoteProvider`].
#[derive(Clone)]
pub struct DispatchQueue {
    inner: Arc<QueueInner>,
}

impl DispatchQueue {
    /// Create a queue that calls `provider` through `limiter`.
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        limiter: Arc<WindowLimiter>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                provider,
                limiter,
                config,
            }),
        }
    }

    /// Append a fetch for `symbol` to the queue.
    ///
    /// Never blocks. When the queue already holds `max_queue_size` entries
    /// the request is rejected with [`MarketDataError::QueueFull`]; in that
    /// case `on_settle` is also invoked with the same error, so the callback
    /// always runs exactly once.
    ///
    /// Must be called from within a Tokio runtime: the first enqueue after
    /// the queue drains spawns the worker task.
    pub fn enqueue(&self, symbol: &str, on_settle: SettleFn) -> Result<(), MarketDataError> {
        let capacity = self.inner.config.max_queue_size;
        let start_worker = {
            let mut state = self.inner.lock_state();
            if state.entries.len() >= capacity {
                drop(state);
                warn!("Dispatch queue full ({}), rejecting {}", capacity, symbol);
                let error = MarketDataError::QueueFull { capacity };
                on_settle(Err(error.clone()));
                return Err(error);
            }

            state.entries.push_back(QueueEntry {
                symbol: symbol.to_string(),
                on_settle,
                enqueued_at: Instant::now(),
            });
            debug!(
                "Dispatch queue: enqueued {} ({} pending)",
                symbol,
                state.entries.len()
            );

            // Re-entrant start is a no-op
            !std::mem::replace(&mut state.worker_running, true)
        };

        if start_worker {
            debug!("Dispatch queue: starting worker");
            tokio::spawn(run_worker(self.inner.clone()));
        }

        Ok(())
    }

    /// Number of entries waiting to be dispatched.
    pub fn len(&self) -> usize {
        self.inner.lock_state().entries.len()
    }

    /// Whether no entries are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the worker task is currently alive.
    pub fn is_worker_running(&self) -> bool {
        self.inner.lock_state().worker_running
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.config.max_queue_size
    }

    /// The limiter gating this queue.
    pub fn limiter(&self) -> &Arc<WindowLimiter> {
        &self.inner.limiter
    }
}

/// Worker loop: one upstream call at a time, strictly FIFO.
async fn run_worker(inner: Arc<QueueInner>) {
    loop {
        let entry = {
            let mut state = inner.lock_state();
            match state.entries.pop_front() {
                Some(entry) => entry,
                None => {
                    state.worker_running = false;
                    debug!("Dispatch queue: drained, worker stopping");
                    return;
                }
            }
        };

        inner.limiter.acquire().await;

        let outcome = call_upstream(&inner, &entry.symbol).await;
        match &outcome {
            Ok(quote) => info!(
                "Fetched {} @ {} after {:?} in queue",
                entry.symbol,
                quote.price,
                entry.enqueued_at.elapsed()
            ),
            Err(e) => warn!("Upstream fetch for {} failed: {}", entry.symbol, e),
        }
        (entry.on_settle)(outcome);

        tokio::time::sleep(inner.config.request_interval).await;
    }
}

/// Perform one provider call on its own task so that a hang is bounded by
/// the timeout and a panic cannot take the worker down with it.
async fn call_upstream(inner: &QueueInner, symbol: &str) -> Result<Quote, MarketDataError> {
    let provider = inner.provider.clone();
    let provider_id = provider.id();
    let owned_symbol = symbol.to_string();
    let mut call =
        tokio::spawn(async move { provider.get_latest_quote(&owned_symbol).await });

    let timeout = inner.config.upstream_timeout;
    match tokio::time::timeout(timeout, &mut call).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(MarketDataError::ProviderError {
            provider: provider_id.to_string(),
            message: format!("Provider task failed: {}", join_error),
        }),
        Err(_) => {
            call.abort();
            Err(MarketDataError::Timeout {
                provider: provider_id.to_string(),
                after: timeout,
            })
        }
    }
}
