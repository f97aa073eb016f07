//! Core error types for the quote gateway.
//!
//! Upstream unavailability is not an error at this level: the quote service
//! absorbs it into degraded or synthetic responses. What remains are
//! caller mistakes and internal faults.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the quote gateway.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    #[error("Unexpected error: {0}")]
    Internal(String),
}
