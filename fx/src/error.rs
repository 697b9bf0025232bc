//! FX error types.

use chrono::NaiveDate;
use currex_common::{Currency, CurrencyError, CurrencyPair};
use currex_store::StoreError;
use thiserror::Error;

/// Errors that can occur in rate resolution and conversion.
#[derive(Debug, Error)]
pub enum FxError {
    /// Amount is not a positive number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Both sides of the conversion are the same currency.
    #[error("Cannot convert {0} to itself")]
    SameCurrency(Currency),

    /// Currency code outside the supported set.
    #[error(transparent)]
    UnsupportedCurrency(#[from] CurrencyError),

    /// Live provider failed, timed out or returned unusable data.
    #[error("Rate provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No historical rate could be obtained.
    #[error("Historical rate for {pair} on {date} unavailable: {reason}")]
    HistoricalUnavailable {
        pair: CurrencyPair,
        date: NaiveDate,
        reason: String,
    },

    /// Range start lies after its end, or in the future.
    #[error("Invalid date range {start}..{end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Preference persistence failed.
    #[error(transparent)]
    Preferences(#[from] StoreError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FxError {
    /// Errors caused by user input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FxError::InvalidAmount(_)
                | FxError::SameCurrency(_)
                | FxError::UnsupportedCurrency(_)
                | FxError::InvalidDateRange { .. }
        )
    }

    /// Stable code used to look up user-facing messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::InvalidAmount(_) => "INVALID_AMOUNT",
            FxError::SameCurrency(_) => "SAME_CURRENCY",
            FxError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            FxError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            FxError::HistoricalUnavailable { .. } => "HISTORICAL_UNAVAILABLE",
            FxError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            FxError::Preferences(StoreError::AlreadyExists(_)) => "ALREADY_EXISTS",
            FxError::Preferences(_) => "PREFERENCES_ERROR",
            FxError::Config(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let pair = CurrencyPair::new(Currency::Usd, Currency::Eur);
        assert_eq!(FxError::InvalidAmount("-5".into()).error_code(), "INVALID_AMOUNT");
        assert_eq!(
            FxError::Preferences(StoreError::AlreadyExists(pair)).error_code(),
            "ALREADY_EXISTS"
        );
        assert!(FxError::SameCurrency(Currency::Usd).is_validation());
        assert!(!FxError::ProviderUnavailable("down".into()).is_validation());
    }
}
