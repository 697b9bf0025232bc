//! Error types for currency parsing.

use thiserror::Error;

/// Errors raised while parsing currencies and pairs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Currency code outside the supported set.
    #[error("Unsupported currency: {0}")]
    Unsupported(String),

    /// Pair not in `FROM-TO` form.
    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),
}
