//! Provider rate limiting hints.

use std::time::Duration;

/// Rate limiting configuration advertised by a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their rate limits and getting blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed per window.
    pub max_calls: u32,

    /// Length of the fixed rate limit window.
    pub window: Duration,

    /// Minimum delay between requests.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_calls: 60,
            window: Duration::from_secs(60),
            min_delay: Duration::from_millis(100),
        }
    }
}
