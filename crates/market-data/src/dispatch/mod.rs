//! Rate-limited dispatch of upstream calls.
//!
//! - [`Clock`] - monotonic time source
//! - [`WindowLimiter`] - fixed-window call counter
//! - [`DispatchQueue`] - bounded FIFO drained by a single worker

mod clock;
mod dispatch_queue;
mod window_limiter;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use dispatch_queue::{
    DispatchConfig, DispatchQueue, SettleFn, DEFAULT_MAX_QUEUE_SIZE, DEFAULT_UPSTREAM_TIMEOUT,
};
pub use window_limiter::{Admission, WindowLimiter};
