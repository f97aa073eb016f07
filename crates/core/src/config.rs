//! Gateway tunables.

use std::time::Duration;

use quotegate_market_data::DispatchConfig;

use crate::errors::{Error, Result};
use crate::quotes::constants::{
    DEFAULT_CALLER_TIMEOUT, DEFAULT_FRESH_TTL, DEFAULT_MAX_CALLS_PER_WINDOW,
    DEFAULT_MAX_QUEUE_SIZE, DEFAULT_RATE_WINDOW, DEFAULT_REQUEST_INTERVAL, DEFAULT_STALE_TTL,
    DEFAULT_UPSTREAM_TIMEOUT,
};

/// Configuration for the quote read path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Upstream calls admitted per rate window.
    pub max_calls_per_window: u32,
    /// Length of the fixed rate window.
    pub rate_window: Duration,
    /// Pause after every upstream call.
    pub request_interval: Duration,
    /// Timeout for a single upstream call.
    pub upstream_timeout: Duration,
    /// How long one caller waits on a (possibly coalesced) fetch.
    pub caller_timeout: Duration,
    /// Pending fetches allowed in the dispatch queue.
    pub max_queue_size: usize,
    /// Cached quotes younger than this are served without upstream involvement.
    pub fresh_ttl: Duration,
    /// Cached quotes younger than this may be served when the upstream fails.
    pub stale_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_calls_per_window: DEFAULT_MAX_CALLS_PER_WINDOW,
            rate_window: DEFAULT_RATE_WINDOW,
            request_interval: DEFAULT_REQUEST_INTERVAL,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            caller_timeout: DEFAULT_CALLER_TIMEOUT,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            fresh_ttl: DEFAULT_FRESH_TTL,
            stale_ttl: DEFAULT_STALE_TTL,
        }
    }
}

impl GatewayConfig {
    /// Reject settings the read path cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_calls_per_window == 0 {
            return Err(Error::InvalidConfig(
                "max_calls_per_window must be at least 1".to_string(),
            ));
        }
        if self.rate_window.is_zero() {
            return Err(Error::InvalidConfig(
                "rate_window must be non-zero".to_string(),
            ));
        }
        if self.max_queue_size == 0 {
            return Err(Error::InvalidConfig(
                "max_queue_size must be at least 1".to_string(),
            ));
        }
        if self.stale_ttl <= self.fresh_ttl {
            return Err(Error::InvalidConfig(format!(
                "stale_ttl ({:?}) must exceed fresh_ttl ({:?})",
                self.stale_ttl, self.fresh_ttl
            )));
        }
        Ok(())
    }

    /// Settings for the dispatch queue.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_queue_size: self.max_queue_size,
            request_interval: self.request_interval,
            upstream_timeout: self.upstream_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fresh_ttl, Duration::from_secs(300));
        assert_eq!(config.stale_ttl, Duration::from_secs(3600));
        assert_eq!(config.rate_window, Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = GatewayConfig {
            fresh_ttl: Duration::from_secs(600),
            stale_ttl: Duration::from_secs(600),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = GatewayConfig {
            max_calls_per_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            max_queue_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dispatch_config_mirrors_gateway() {
        let config = GatewayConfig {
            max_queue_size: 7,
            request_interval: Duration::from_millis(250),
            upstream_timeout: Duration::from_secs(3),
            ..Default::default()
        };
        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.max_queue_size, 7);
        assert_eq!(dispatch.request_interval, Duration::from_millis(250));
        assert_eq!(dispatch.upstream_timeout, Duration::from_secs(3));
    }
}
