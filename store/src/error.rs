//! Store error types.

use currex_common::CurrencyPair;
use thiserror::Error;

/// Errors that can occur while persisting user state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Favorite pair is already saved.
    #[error("Currency pair {0} is already in favorites")]
    AlreadyExists(CurrencyPair),

    /// Backing file could not be read or written.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Informational errors leave the store unchanged and can be shown to
    /// the user as a warning.
    pub fn is_informational(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
