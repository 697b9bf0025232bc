//! Currency conversion types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use currex_common::{Currency, CurrencyPair, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FxError, FxResult};

/// What started a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionTrigger {
    /// Explicit request by the user; updates the preferred currencies.
    User,
    /// Recalculation after an input change, swap or favorite selection.
    Auto,
}

/// Request to perform a conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Amount in `pair.from`.
    pub amount: Decimal,
    /// Currencies to convert between.
    pub pair: CurrencyPair,
    /// What started the conversion.
    pub trigger: ConversionTrigger,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(amount: Decimal, from: Currency, to: Currency, trigger: ConversionTrigger) -> Self {
        Self {
            amount,
            pair: CurrencyPair::new(from, to),
            trigger,
        }
    }

    /// A user-initiated request.
    pub fn user(amount: Decimal, from: Currency, to: Currency) -> Self {
        Self::new(amount, from, to, ConversionTrigger::User)
    }

    /// An automatic request.
    pub fn auto(amount: Decimal, from: Currency, to: Currency) -> Self {
        Self::new(amount, from, to, ConversionTrigger::Auto)
    }

    /// The same amount with the currencies exchanged, as an automatic
    /// request.
    pub fn swapped(&self) -> Self {
        Self {
            amount: self.amount,
            pair: self.pair.inverse(),
            trigger: ConversionTrigger::Auto,
        }
    }
}

/// A completed currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Position in request order.
    pub sequence: u64,
    /// Input amount.
    pub amount: Decimal,
    /// Converted amount, rounded to two places.
    pub converted: Decimal,
    /// Rate used for conversion.
    pub rate: Rate,
    /// What started the conversion.
    pub trigger: ConversionTrigger,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Convert `amount` at `rate`.
    ///
    /// An amount whose converted value does not fit in a `Decimal` is
    /// rejected as [`FxError::InvalidAmount`].
    pub fn new(
        sequence: u64,
        amount: Decimal,
        rate: Rate,
        trigger: ConversionTrigger,
    ) -> FxResult<Self> {
        let converted = rate
            .convert(amount)
            .ok_or_else(|| FxError::InvalidAmount(amount.to_string()))?;

        Ok(Self {
            id: Uuid::now_v7(),
            sequence,
            amount,
            converted,
            rate,
            trigger,
            executed_at: Utc::now(),
        })
    }

    /// The rate value used.
    pub fn rate_used(&self) -> Decimal {
        self.rate.value
    }

    /// Get the currency pair.
    pub fn pair(&self) -> CurrencyPair {
        self.rate.pair
    }
}

/// Check that an amount is a positive number.
pub fn validate_amount(amount: Decimal) -> FxResult<Decimal> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(FxError::InvalidAmount(amount.to_string()))
    }
}

/// Parse user input into a positive amount.
///
/// Accepts plain and scientific notation; rejects empty, non-numeric,
/// zero and negative input.
pub fn parse_amount(input: &str) -> FxResult<Decimal> {
    let trimmed = input.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| FxError::InvalidAmount(input.to_string()))?;
    validate_amount(amount)
}
