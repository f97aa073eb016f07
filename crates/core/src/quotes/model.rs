//! Domain models for served quotes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quotegate_market_data::Quote as MarketQuote;

use super::constants::DATA_SOURCE_SYNTHETIC;

/// Quote record served to callers.
///
/// Immutable once built; a refresh replaces the whole record. Price fields
/// are `None` only on synthetic placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Option<Decimal>,
    pub change: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub volume: Option<u64>,
    /// Source-provided timestamp, or creation time for placeholders.
    pub last_updated: DateTime<Utc>,
    pub source: String,
    pub synthetic: bool,
}

impl Quote {
    /// Placeholder for a symbol with no real or usable stale data.
    pub fn synthetic(symbol: &str, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: None,
            change: None,
            change_percent: None,
            volume: None,
            last_updated: now,
            source: DATA_SOURCE_SYNTHETIC.to_string(),
            synthetic: true,
        }
    }
}

impl From<MarketQuote> for Quote {
    fn from(q: MarketQuote) -> Self {
        Self {
            symbol: q.symbol,
            price: Some(q.price),
            change: Some(q.change),
            change_percent: Some(q.change_percent),
            volume: Some(q.volume),
            last_updated: q.timestamp,
            source: q.source,
            synthetic: false,
        }
    }
}

/// Which layer of the fallback chain produced a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Served from cache, younger than the fresh threshold.
    Fresh,
    /// Fetched from the upstream for this request.
    Live,
    /// Upstream failed; served a stale cache entry.
    Degraded,
    /// Upstream failed and nothing usable was cached.
    Synthetic,
}

/// Response envelope returned by the quote service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote: Quote,
    pub status: QuoteStatus,
    /// Seconds since the served quote was cached; `None` for placeholders.
    pub age_secs: Option<u64>,
}

impl QuoteResponse {
    /// Whether the caller is getting something other than current data.
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, QuoteStatus::Degraded | QuoteStatus::Synthetic)
    }
}

/// Operational counters for the health endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    /// Fetches waiting in the dispatch queue.
    pub queue_length: usize,
    /// Symbols held in the quote cache.
    pub cache_size: usize,
    /// Upstream calls admitted in the current rate window.
    pub calls_in_window: u32,
    /// Symbols with an outstanding upstream fetch.
    pub in_flight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_market_quote() {
        let market = MarketQuote {
            symbol: "AAPL".to_string(),
            price: dec!(250.00),
            change: dec!(-1.25),
            change_percent: dec!(-0.4975),
            volume: 1_000_000,
            timestamp: Utc::now(),
            source: "ALPHA_VANTAGE".to_string(),
        };
        let quote = Quote::from(market);
        assert_eq!(quote.price, Some(dec!(250.00)));
        assert_eq!(quote.change, Some(dec!(-1.25)));
        assert_eq!(quote.volume, Some(1_000_000));
        assert!(!quote.synthetic);
    }

    #[test]
    fn test_synthetic_quote_has_no_prices() {
        let quote = Quote::synthetic("ZZZZ", Utc::now());
        assert!(quote.synthetic);
        assert!(quote.price.is_none());
        assert!(quote.change.is_none());
        assert!(quote.volume.is_none());
        assert_eq!(quote.source, DATA_SOURCE_SYNTHETIC);
    }

    #[test]
    fn test_response_serialization() {
        let response = QuoteResponse {
            quote: Quote::synthetic("ZZZZ", Utc::now()),
            status: QuoteStatus::Synthetic,
            age_secs: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "synthetic");
        assert_eq!(json["quote"]["synthetic"], true);
        assert!(json["quote"]["price"].is_null());
        assert!(json["ageSecs"].is_null());
        assert!(response.is_degraded());
    }
}
