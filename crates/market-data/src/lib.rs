//! Quotegate Market Data Crate
//!
//! Upstream side of the quote gateway: the provider abstraction and the
//! rate-limited dispatch path every upstream call goes through.
//!
//! # Architecture
//!
//! ```text
//!   enqueue(symbol, on_settle)
//!            |
//!            v
//!   +------------------+
//!   |  DispatchQueue   |  (bounded FIFO, single worker)
//!   +------------------+
//!            |
//!            v
//!   +------------------+
//!   |  WindowLimiter   |  (max calls per fixed window)
//!   +------------------+
//!            |
//!            v
//!   +------------------+
//!   |  QuoteProvider   |  (Alpha Vantage, ...)
//!   +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Latest quote as reported by a provider
//! - [`QuoteProvider`] - Upstream provider trait
//! - [`DispatchQueue`] - Bounded FIFO with spacing and per-call timeout
//! - [`WindowLimiter`] - Fixed-window call limiter
//! - [`Clock`] - Monotonic time source
//! - [`MarketDataError`] - Upstream error taxonomy

pub mod dispatch;
pub mod errors;
pub mod models;
pub mod provider;

pub use dispatch::{
    Admission, Clock, DispatchConfig, DispatchQueue, ManualClock, MonotonicClock, SettleFn,
    WindowLimiter,
};
pub use errors::MarketDataError;
pub use models::Quote;
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::{QuoteProvider, RateLimit};
