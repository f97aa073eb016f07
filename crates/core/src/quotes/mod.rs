//! Quote read path.
//!
//! - [`model`] - served quote, response envelope and stats
//! - [`symbol`] - symbol normalisation
//! - [`cache`] - fresh / stale / expired quote cache
//! - [`coalescer`] - one upstream fetch per symbol at a time
//! - [`service`] - the orchestrator tying it together
//! - [`constants`] - default thresholds and limits
//!
//! # Architecture
//!
//! ```text
//! QuoteService → QuoteCache (fresh hit)
//!      ↓
//! RequestCoalescer → DispatchQueue → WindowLimiter → QuoteProvider
//!      ↓ (on settle)
//! QuoteCache (write-through)
//! ```

pub mod cache;
pub mod coalescer;
pub mod constants;
pub mod errors;
pub mod model;
pub mod service;
pub mod symbol;


pub use cache::{CacheEntry, Freshness, QuoteCache};
pub use coalescer::{Dispatch, RequestCoalescer};
pub use errors::FetchError;
pub use model::{GatewayStats, Quote, QuoteResponse, QuoteStatus};
pub use service::{QuoteService, QuoteServiceTrait};
pub use symbol::normalize_symbol;
