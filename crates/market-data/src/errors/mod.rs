//! Error types for upstream quote fetching.
//!
//! Every failure a caller can observe from the dispatch path is a
//! [`MarketDataError`]. The type is `Clone` because one settled outcome is
//! handed to every caller coalesced onto the same fetch.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching a quote from the upstream provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider reported that its own rate limit was hit.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The upstream call did not settle within the per-call timeout.
    #[error("Timeout: {provider} after {after:?}")]
    Timeout {
        /// The provider that timed out
        provider: String,
        /// How long the call was allowed to run
        after: Duration,
    },

    /// A provider-specific or network failure.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The dispatch queue is at capacity; the request was not enqueued.
    #[error("Queue full: {capacity} requests pending")]
    QueueFull {
        /// Configured maximum queue length
        capacity: usize,
    },

    /// The fetch was dropped before it produced an outcome.
    #[error("Fetch dropped before settling")]
    Dropped,
}

impl MarketDataError {
    /// Whether the failure came from the upstream itself, as opposed to
    /// local back-pressure (`QueueFull`) or an internal fault (`Dropped`).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound(_)
                | Self::RateLimited { .. }
                | Self::Timeout { .. }
                | Self::ProviderError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(MarketDataError::SymbolNotFound("XYZ".to_string()).is_upstream());
        assert!(MarketDataError::RateLimited {
            provider: "ALPHA_VANTAGE".to_string()
        }
        .is_upstream());
        assert!(MarketDataError::Timeout {
            provider: "ALPHA_VANTAGE".to_string(),
            after: Duration::from_secs(10),
        }
        .is_upstream());
        assert!(!MarketDataError::QueueFull { capacity: 50 }.is_upstream());
        assert!(!MarketDataError::Dropped.is_upstream());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::QueueFull { capacity: 3 };
        assert_eq!(format!("{}", error), "Queue full: 3 requests pending");

        let error = MarketDataError::ProviderError {
            provider: "ALPHA_VANTAGE".to_string(),
            message: "API key invalid".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: ALPHA_VANTAGE - API key invalid"
        );
    }
}
