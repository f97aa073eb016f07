//! Quote fetch error types.

use std::time::Duration;

use thiserror::Error;

use quotegate_market_data::MarketDataError;

/// Outcome of one caller's wait on a coalesced fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The shared fetch settled with an upstream, queue or internal error.
    /// Every caller attached to the fetch sees the same error.
    #[error(transparent)]
    Upstream(#[from] MarketDataError),

    /// This caller stopped waiting. The fetch itself keeps running and other
    /// attached callers are unaffected.
    #[error("Gave up on {symbol} after {waited:?}")]
    CallerTimeout { symbol: String, waited: Duration },
}
