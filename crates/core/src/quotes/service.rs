//! Quote orchestrator.
//!
//! Resolves "get quote for symbol" through the fallback chain:
//!
//! 1. fresh cache entry
//! 2. coalesced upstream fetch (written through to the cache on success)
//! 3. stale cache entry, marked degraded
//! 4. synthetic placeholder, never cached
//!
//! Upstream failures never reach the caller; only invalid input and internal
//! faults are returned as errors.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

use quotegate_market_data::{
    Clock, DispatchQueue, MarketDataError, MonotonicClock, QuoteProvider, WindowLimiter,
};

use super::cache::{Freshness, QuoteCache};
use super::coalescer::{Dispatch, RequestCoalescer};
use super::errors::FetchError;
use super::model::{GatewayStats, Quote, QuoteResponse, QuoteStatus};
use super::symbol::normalize_symbol;
use crate::config::GatewayConfig;
use crate::errors::{Error, Result};

/// Read path for quotes.
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Get the best available quote for a symbol.
    ///
    /// Fails only with `InvalidInput` for malformed symbols or `Internal`
    /// when a fetch was lost without an outcome.
    async fn get_quote(&self, symbol: &str) -> Result<QuoteResponse>;

    /// Start background fetches for symbols that are not fresh in the cache.
    /// Returns the number of fetches started.
    async fn warm_up(&self, symbols: &[String]) -> usize;

    /// Current operational counters.
    fn stats(&self) -> GatewayStats;
}

pub struct QuoteService {
    cache: Arc<QuoteCache>,
    queue: DispatchQueue,
    coalescer: Arc<RequestCoalescer>,
}

impl QuoteService {
    /// Build the read path over `provider` with the default monotonic clock.
    pub fn new(provider: Arc<dyn QuoteProvider>, config: &GatewayConfig) -> Result<Self> {
        Self::with_clock(provider, config, Arc::new(MonotonicClock))
    }

    /// Build the read path with an explicit clock shared by the limiter and
    /// the cache.
    pub fn with_clock(
        provider: Arc<dyn QuoteProvider>,
        config: &GatewayConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            "Quote service over {}: {} calls per {:?}, spacing {:?}, queue {}",
            provider.id(),
            config.max_calls_per_window,
            config.rate_window,
            config.request_interval,
            config.max_queue_size
        );

        let advertised = provider.rate_limit();
        let configured_rate =
            config.max_calls_per_window as f64 / config.rate_window.as_secs_f64();
        let advertised_rate = advertised.max_calls as f64 / advertised.window.as_secs_f64();
        if configured_rate > advertised_rate || config.request_interval < advertised.min_delay {
            warn!(
                "Configured budget exceeds what {} advertises ({} calls per {:?}, {:?} apart)",
                provider.id(),
                advertised.max_calls,
                advertised.window,
                advertised.min_delay
            );
        }

        let limiter = Arc::new(WindowLimiter::new(
            config.max_calls_per_window,
            config.rate_window,
            clock.clone(),
        ));
        let queue = DispatchQueue::new(provider, limiter, config.dispatch_config());
        let cache = Arc::new(QuoteCache::new(clock, config.fresh_ttl, config.stale_ttl));
        let coalescer = Arc::new(RequestCoalescer::new(
            queue.clone(),
            cache.clone(),
            config.caller_timeout,
        ));

        Ok(Self {
            cache,
            queue,
            coalescer,
        })
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    /// Serve whatever the cache still allows after a failed fetch.
    fn fallback(&self, symbol: &str) -> QuoteResponse {
        match self.cache.lookup(symbol) {
            // A concurrent fetch may have landed meanwhile
            Some((entry, Freshness::Fresh)) => {
                let age = entry.age(self.cache.clock().now());
                QuoteResponse {
                    quote: entry.quote,
                    status: QuoteStatus::Fresh,
                    age_secs: Some(age.as_secs()),
                }
            }
            Some((entry, Freshness::Stale)) => {
                let age = entry.age(self.cache.clock().now());
                info!("Serving stale {} ({}s old)", symbol, age.as_secs());
                QuoteResponse {
                    quote: entry.quote,
                    status: QuoteStatus::Degraded,
                    age_secs: Some(age.as_secs()),
                }
            }
            Some((_, Freshness::Expired)) | None => {
                info!("No usable cache for {}, serving placeholder", symbol);
                QuoteResponse {
                    quote: Quote::synthetic(symbol, Utc::now()),
                    status: QuoteStatus::Synthetic,
                    age_secs: None,
                }
            }
        }
    }
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn get_quote(&self, symbol: &str) -> Result<QuoteResponse> {
        let symbol = normalize_symbol(symbol)?;

        if let Some((entry, Freshness::Fresh)) = self.cache.lookup(&symbol) {
            let age = entry.age(self.cache.clock().now());
            debug!("Cache hit for {} ({}s old)", symbol, age.as_secs());
            return Ok(QuoteResponse {
                quote: entry.quote,
                status: QuoteStatus::Fresh,
                age_secs: Some(age.as_secs()),
            });
        }

        match self.coalescer.fetch(&symbol).await {
            Ok(quote) => Ok(QuoteResponse {
                quote,
                status: QuoteStatus::Live,
                age_secs: Some(0),
            }),
            Err(FetchError::Upstream(MarketDataError::Dropped)) => Err(Error::Internal(format!(
                "Fetch for {} ended without an outcome",
                symbol
            ))),
            Err(FetchError::Upstream(err)) if err.is_upstream() => {
                warn!("Upstream fetch for {} failed: {}", symbol, err);
                Ok(self.fallback(&symbol))
            }
            Err(FetchError::Upstream(err)) => {
                warn!("Shedding {}: {}", symbol, err);
                Ok(self.fallback(&symbol))
            }
            Err(err @ FetchError::CallerTimeout { .. }) => {
                warn!("{}", err);
                Ok(self.fallback(&symbol))
            }
        }
    }

    async fn warm_up(&self, symbols: &[String]) -> usize {
        let mut started = 0;

        for raw in symbols {
            let symbol = match normalize_symbol(raw) {
                Ok(symbol) => symbol,
                Err(err) => {
                    warn!("Skipping warm-up for {:?}: {}", raw, err);
                    continue;
                }
            };

            if let Some((_, Freshness::Fresh)) = self.cache.lookup(&symbol) {
                continue;
            }

            match self.coalescer.prefetch(&symbol) {
                (Dispatch::Enqueued, fetch) => {
                    started += 1;
                    tokio::spawn(async move {
                        match fetch.await {
                            Ok(_) => debug!("Warmed {}", symbol),
                            Err(err) => warn!("Warm-up for {} failed: {}", symbol, err),
                        }
                    });
                }
                (Dispatch::Attached | Dispatch::Cached, _) => {}
                (Dispatch::Rejected, _) => {
                    warn!("Warm-up for {} rejected, queue full", symbol);
                }
            }
        }

        info!("Warm-up started {} of {} fetches", started, symbols.len());
        started
    }

    fn stats(&self) -> GatewayStats {
        GatewayStats {
            queue_length: self.queue.len(),
            cache_size: self.cache.len(),
            calls_in_window: self.queue.limiter().calls_in_window(),
            in_flight: self.coalescer.in_flight_len(),
        }
    }
}
