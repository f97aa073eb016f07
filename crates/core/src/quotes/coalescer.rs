//! Per-symbol request coalescing.
//!
//! At most one upstream fetch per symbol is outstanding. The first caller
//! registers a shared completion and enqueues the fetch; later callers for
//! the same symbol attach to that completion. Registration happens
//! synchronously before any await, so two callers can never both observe
//! "nothing in flight" and both enqueue.
//!
//! On settlement the successful quote is written to the cache, the registry
//! entry is removed and every attached caller is woken with the same
//! outcome. A caller timing out only stops that caller's wait.
//!
//! Settlement writes the cache before releasing the registry slot, so a
//! caller that finds no outstanding fetch re-checks the cache under the
//! registry lock and is served a quote that landed in the meantime.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use tokio::sync::oneshot;

use quotegate_market_data::{DispatchQueue, MarketDataError, Quote as MarketQuote, SettleFn};

use super::cache::{Freshness, QuoteCache};
use super::errors::FetchError;
use super::model::Quote;

type FetchOutcome = Result<Quote, MarketDataError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<String, InFlight>,
}

type RegistryHandle = Arc<Mutex<Registry>>;

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| {
        warn!("Coalescer registry mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// How a fetch request was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Joined an outstanding fetch for the symbol.
    Attached,
    /// Started a new fetch.
    Enqueued,
    /// A fresh quote was already cached; no fetch needed.
    Cached,
    /// The dispatch queue refused the fetch.
    Rejected,
}

/// Completes a registered fetch exactly once.
struct Settlement {
    symbol: String,
    id: u64,
    registry: RegistryHandle,
    cache: Arc<QuoteCache>,
    tx: Option<oneshot::Sender<FetchOutcome>>,
}

impl Settlement {
    fn settle(mut self, outcome: Result<MarketQuote, MarketDataError>) {
        let outcome = outcome.map(Quote::from);
        if let Ok(quote) = &outcome {
            self.cache.put(&self.symbol, quote.clone());
        }
        self.complete(outcome);
    }

    fn complete(&mut self, outcome: FetchOutcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        {
            let mut registry = lock_registry(&self.registry);
            // A later fetch may already own the slot
            if registry
                .entries
                .get(&self.symbol)
                .is_some_and(|entry| entry.id == self.id)
            {
                registry.entries.remove(&self.symbol);
            }
        }

        // Nobody listening is fine
        let _ = tx.send(outcome);
    }
}

impl Drop for Settlement {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!("Fetch for {} was dropped without settling", self.symbol);
            self.complete(Err(MarketDataError::Dropped));
        }
    }
}

/// Deduplicates concurrent fetches for the same symbol.
pub struct RequestCoalescer {
    registry: RegistryHandle,
    queue: DispatchQueue,
    cache: Arc<QuoteCache>,
    caller_timeout: Duration,
}

impl RequestCoalescer {
    pub fn new(queue: DispatchQueue, cache: Arc<QuoteCache>, caller_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            queue,
            cache,
            caller_timeout,
        }
    }

    /// Fetch `symbol`, sharing any outstanding fetch for it.
    ///
    /// Waits at most the caller timeout. Timing out does not cancel the
    /// underlying fetch; its result still lands in the cache.
    pub async fn fetch(&self, symbol: &str) -> Result<Quote, FetchError> {
        let (fetch, _) = self.attach_or_dispatch(symbol);

        match tokio::time::timeout(self.caller_timeout, fetch).await {
            Ok(outcome) => outcome.map_err(FetchError::from),
            Err(_) => {
                debug!(
                    "Caller gave up waiting for {} after {:?}",
                    symbol, self.caller_timeout
                );
                Err(FetchError::CallerTimeout {
                    symbol: symbol.to_string(),
                    waited: self.caller_timeout,
                })
            }
        }
    }

    /// Start (or join) a fetch for `symbol` without waiting for it.
    ///
    /// The returned future resolves with the shared outcome and is not
    /// bounded by the caller timeout.
    pub fn prefetch(
        &self,
        symbol: &str,
    ) -> (
        Dispatch,
        impl Future<Output = Result<Quote, MarketDataError>> + Send + 'static,
    ) {
        let (fetch, dispatch) = self.attach_or_dispatch(symbol);
        (dispatch, fetch)
    }

    /// Number of symbols with an outstanding fetch.
    pub fn in_flight_len(&self) -> usize {
        lock_registry(&self.registry).entries.len()
    }

    fn attach_or_dispatch(&self, symbol: &str) -> (SharedFetch, Dispatch) {
        let (settlement, fetch) = {
            let mut registry = lock_registry(&self.registry);
            if let Some(existing) = registry.entries.get(symbol) {
                debug!("Attaching to in-flight fetch for {}", symbol);
                return (existing.fetch.clone(), Dispatch::Attached);
            }

            if let Some((entry, Freshness::Fresh)) = self.cache.lookup(symbol) {
                debug!("Fresh quote for {} landed before dispatch", symbol);
                let ready = futures::future::ready::<FetchOutcome>(Ok(entry.quote))
                    .boxed()
                    .shared();
                return (ready, Dispatch::Cached);
            }

            let (tx, rx) = oneshot::channel::<FetchOutcome>();
            let fetch: SharedFetch = rx
                .map(|received| received.unwrap_or_else(|_| Err(MarketDataError::Dropped)))
                .boxed()
                .shared();

            registry.next_id += 1;
            let id = registry.next_id;
            registry.entries.insert(
                symbol.to_string(),
                InFlight {
                    id,
                    fetch: fetch.clone(),
                },
            );

            let settlement = Settlement {
                symbol: symbol.to_string(),
                id,
                registry: self.registry.clone(),
                cache: self.cache.clone(),
                tx: Some(tx),
            };
            (settlement, fetch)
        };

        // Registry lock must be released here: a rejected enqueue settles inline
        let on_settle: SettleFn = Box::new(move |outcome| settlement.settle(outcome));
        match self.queue.enqueue(symbol, on_settle) {
            Ok(()) => (fetch, Dispatch::Enqueued),
            Err(err) => {
                debug!("Fetch for {} rejected: {}", symbol, err);
                (fetch, Dispatch::Rejected)
            }
        }
    }
}
