//! Ticker symbol normalisation.

use crate::errors::{Error, Result};
use crate::quotes::constants::MAX_SYMBOL_LEN;

/// Trim and upper-case a ticker symbol, rejecting anything that cannot be one.
///
/// Accepts letters, digits and `.`, `-`, `^`, `=` (share classes, indices,
/// FX pairs), up to [`MAX_SYMBOL_LEN`] characters.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();

    if symbol.is_empty() {
        return Err(Error::InvalidInput("Symbol is required".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(Error::InvalidInput(format!(
            "Symbol '{}' exceeds {} characters",
            symbol, MAX_SYMBOL_LEN
        )));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(Error::InvalidInput(format!(
            "Symbol '{}' contains invalid character '{}'",
            symbol, bad
        )));
    }

    Ok(symbol)
}
