//! Upstream quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all providers implement
//! - Provider rate limiting hints
//! - The Alpha Vantage provider

mod capabilities;
mod traits;

pub mod alpha_vantage;

// Re-exports
pub use capabilities::RateLimit;
pub use traits::QuoteProvider;
