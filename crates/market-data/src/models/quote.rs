use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest quote as reported by an upstream provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol as echoed by the provider
    pub symbol: String,

    /// Last traded price
    pub price: Decimal,

    /// Absolute change versus previous close
    pub change: Decimal,

    /// Percent change versus previous close (e.g. `1.25` for 1.25%)
    pub change_percent: Decimal,

    /// Trading volume for the session
    pub volume: u64,

    /// Timestamp the provider attached to the quote
    pub timestamp: DateTime<Utc>,

    /// Source of the quote (ALPHA_VANTAGE, etc.)
    pub source: String,
}

impl Quote {
    /// Create a quote with no change information.
    pub fn new(symbol: String, price: Decimal, timestamp: DateTime<Utc>, source: String) -> Self {
        Self {
            symbol,
            price,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            volume: 0,
            timestamp,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new(
            "AAPL".to_string(),
            dec!(250.00),
            Utc::now(),
            "ALPHA_VANTAGE".to_string(),
        );
        assert_eq!(quote.price, dec!(250.00));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.volume, 0);
    }
}
