//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that every upstream
//! quote source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Quote;

use super::capabilities::RateLimit;

/// Trait for upstream quote providers.
///
/// Providers are treated as untrusted and slow: they may fail, hang or
/// enforce an undisclosed rate limit of their own. Callers never invoke a
/// provider directly; every call goes through the
/// [`DispatchQueue`](crate::dispatch::DispatchQueue).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quotegate_market_data::provider::{QuoteProvider, RateLimit};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "ALPHA_VANTAGE".
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Rate limiting hints for this provider.
    ///
    /// The gateway warns at start-up when its configured budget exceeds
    /// what the provider advertises.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch the latest quote for an uppercase ticker symbol.
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;
}
