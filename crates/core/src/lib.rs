//! Quotegate core.
//!
//! The resilient read path behind "get quote for symbol": a layered cache,
//! per-symbol request coalescing and a fallback chain that turns upstream
//! failures into degraded or synthetic responses.

pub mod config;
pub mod errors;
pub mod quotes;

pub use config::GatewayConfig;
pub use errors::{Error, Result};
pub use quotes::{
    GatewayStats, Quote, QuoteCache, QuoteResponse, QuoteService, QuoteServiceTrait, QuoteStatus,
};
