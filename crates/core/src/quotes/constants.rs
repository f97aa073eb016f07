//! Quote gateway constants.

use std::time::Duration;

/// Source tag carried by placeholder quotes.
pub const DATA_SOURCE_SYNTHETIC: &str = "SYNTHETIC";

/// Longest accepted ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 12;

/// Cached quotes younger than this are served directly (5 minutes).
pub const DEFAULT_FRESH_TTL: Duration = Duration::from_secs(5 * 60);

/// Cached quotes younger than this are usable as a degraded fallback (1 hour).
pub const DEFAULT_STALE_TTL: Duration = Duration::from_secs(60 * 60);

/// Upstream calls admitted per window. Matches the Alpha Vantage free tier.
pub const DEFAULT_MAX_CALLS_PER_WINDOW: u32 = 5;

/// Fixed rate window length.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Spacing between upstream calls; window / max calls keeps the rate smooth.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(12);

/// Timeout for one upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a caller waits on a fetch before giving up.
pub const DEFAULT_CALLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending fetches allowed in the dispatch queue.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 50;
