//! In-memory quote cache with fresh / stale / expired classification.
//!
//! Entries are keyed by symbol and only ever replaced by a newer fetch.
//! Nothing is evicted: an expired entry stays until overwritten, it is just
//! never served.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::debug;
use tokio::time::Instant;

use quotegate_market_data::Clock;

use super::model::Quote;

/// Age tier of a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// age < fresh threshold
    Fresh,
    /// fresh threshold <= age < stale threshold
    Stale,
    /// age >= stale threshold
    Expired,
}

/// A cached quote and when it was fetched.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub quote: Quote,
    /// Monotonic fetch instant; drives classification.
    pub fetched_at: Instant,
    /// Wall-clock time of caching, for display.
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }
}

/// Symbol -> last known quote.
pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    fresh_ttl: Duration,
    stale_ttl: Duration,
}

impl QuoteCache {
    pub fn new(clock: Arc<dyn Clock>, fresh_ttl: Duration, stale_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            fresh_ttl,
            stale_ttl,
        }
    }

    /// Get the entry for a symbol, whatever its age.
    pub fn get(&self, symbol: &str) -> Option<CacheEntry> {
        self.entries.get(symbol).map(|e| e.value().clone())
    }

    /// Store a quote with the current time as its fetch instant, replacing
    /// any prior entry.
    ///
    /// The clock is monotonic, so a symbol's fetch instant never goes
    /// backwards. Returns `false` without touching the cache for synthetic
    /// quotes.
    pub fn put(&self, symbol: &str, quote: Quote) -> bool {
        if quote.synthetic {
            debug!("Quote cache: refusing to cache placeholder for {}", symbol);
            return false;
        }

        let entry = CacheEntry {
            quote,
            fetched_at: self.clock.now(),
            cached_at: Utc::now(),
        };

        self.entries.insert(symbol.to_string(), entry);
        true
    }

    /// Classify an entry's age at `now`.
    pub fn classify(&self, entry: &CacheEntry, now: Instant) -> Freshness {
        let age = entry.age(now);
        if age < self.fresh_ttl {
            Freshness::Fresh
        } else if age < self.stale_ttl {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    /// Entry and its classification at the current time.
    pub fn lookup(&self, symbol: &str) -> Option<(CacheEntry, Freshness)> {
        let entry = self.get(symbol)?;
        let freshness = self.classify(&entry, self.clock.now());
        Some((entry, freshness))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotegate_market_data::ManualClock;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, price: rust_decimal::Decimal) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price: Some(price),
            change: Some(dec!(0)),
            change_percent: Some(dec!(0)),
            volume: Some(10),
            last_updated: Utc::now(),
            source: "TEST".to_string(),
            synthetic: false,
        }
    }

    fn cache() -> (QuoteCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = QuoteCache::new(
            clock.clone(),
            Duration::from_secs(300),
            Duration::from_secs(3600),
        );
        (cache, clock)
    }

    #[test]
    fn test_get_absent() {
        let (cache, _) = cache();
        assert!(cache.get("AAPL").is_none());
        assert!(cache.lookup("AAPL").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _) = cache();
        assert!(cache.put("AAPL", quote("AAPL", dec!(250.00))));

        let entry = cache.get("AAPL").unwrap();
        assert_eq!(entry.quote.price, Some(dec!(250.00)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_classification_tiers() {
        let (cache, clock) = cache();
        cache.put("AAPL", quote("AAPL", dec!(250.00)));

        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Fresh);

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Fresh);

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Stale);

        clock.advance(Duration::from_secs(3299));
        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Stale);

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Expired);

        // Expired entries are retained
        assert!(cache.get("AAPL").is_some());
    }

    #[test]
    fn test_overwrite_replaces_and_refreshes() {
        let (cache, clock) = cache();
        cache.put("AAPL", quote("AAPL", dec!(250.00)));
        clock.advance(Duration::from_secs(600));
        assert_eq!(cache.lookup("AAPL").unwrap().1, Freshness::Stale);

        cache.put("AAPL", quote("AAPL", dec!(251.00)));
        let (entry, freshness) = cache.lookup("AAPL").unwrap();
        assert_eq!(entry.quote.price, Some(dec!(251.00)));
        assert_eq!(freshness, Freshness::Fresh);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fetched_at_never_decreases() {
        let (cache, clock) = cache();
        cache.put("AAPL", quote("AAPL", dec!(250.00)));
        let first = cache.get("AAPL").unwrap().fetched_at;

        clock.advance(Duration::from_secs(30));
        cache.put("AAPL", quote("AAPL", dec!(250.50)));
        let second = cache.get("AAPL").unwrap().fetched_at;
        assert_eq!(second - first, Duration::from_secs(30));

        // Same instant: replaced, still not earlier
        cache.put("AAPL", quote("AAPL", dec!(251.00)));
        let third = cache.get("AAPL").unwrap();
        assert!(third.fetched_at >= second);
        assert_eq!(third.quote.price, Some(dec!(251.00)));
    }

    #[test]
    fn test_synthetic_is_never_cached() {
        let (cache, _) = cache();
        assert!(!cache.put("ZZZZ", Quote::synthetic("ZZZZ", Utc::now())));
        assert!(cache.get("ZZZZ").is_none());
    }
}
