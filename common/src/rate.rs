//! Exchange rates and their provenance.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::CurrencyPair;

/// Decimal places of a converted amount.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Decimal places used when rendering a rate.
pub const RATE_DISPLAY_PLACES: usize = 4;

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Returned by the live rate provider.
    Live,
    /// Taken from the built-in fallback table.
    Fallback,
    /// Generated locally because no live data was available.
    Synthetic,
    /// Same-currency pair; no source consulted.
    Identity,
}

impl Provenance {
    /// Whether the value reflects real market data.
    pub fn is_market_data(&self) -> bool {
        matches!(self, Provenance::Live | Provenance::Identity)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Live => "live",
            Provenance::Fallback => "fallback",
            Provenance::Synthetic => "synthetic",
            Provenance::Identity => "identity",
        };
        f.write_str(s)
    }
}

/// A resolved exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// The currency pair.
    pub pair: CurrencyPair,
    /// Units of `pair.to` per one unit of `pair.from`.
    pub value: Decimal,
    /// Where the value came from.
    pub provenance: Provenance,
    /// Calendar date the rate applies to, for historical rates.
    pub as_of: Option<NaiveDate>,
    /// When this rate was resolved.
    pub resolved_at: DateTime<Utc>,
}

impl Rate {
    /// Create a new rate.
    pub fn new(pair: CurrencyPair, value: Decimal, provenance: Provenance) -> Self {
        Self {
            pair,
            value,
            provenance,
            as_of: None,
            resolved_at: Utc::now(),
        }
    }

    /// The rate of a currency against itself.
    pub fn identity(pair: CurrencyPair) -> Self {
        Self::new(pair, Decimal::ONE, Provenance::Identity)
    }

    /// Attach the calendar date this rate applies to.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Convert an amount, rounding half-up to two decimal places.
    ///
    /// The result always carries exactly two decimal places, so `100 * 0.85`
    /// renders as `85.00`. Returns `None` when the product does not fit in a
    /// `Decimal`.
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        let mut converted = amount.checked_mul(self.value)?.round_dp_with_strategy(
            AMOUNT_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        );
        converted.rescale(AMOUNT_DECIMAL_PLACES);
        Some(converted)
    }

    /// Human readable form, e.g. `1 USD = 0.8500 EUR`.
    pub fn describe(&self) -> String {
        format!(
            "1 {} = {:.prec$} {}",
            self.pair.from,
            self.value,
            self.pair.to,
            prec = RATE_DISPLAY_PLACES
        )
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.describe(), self.provenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use rust_decimal_macros::dec;

    fn usd_eur(value: Decimal) -> Rate {
        Rate::new(
            CurrencyPair::new(Currency::Usd, Currency::Eur),
            value,
            Provenance::Fallback,
        )
    }

    #[test]
    fn test_convert_keeps_two_places() {
        let rate = usd_eur(dec!(0.85));
        assert_eq!(rate.convert(dec!(100)).unwrap().to_string(), "85.00");
        assert_eq!(rate.convert(dec!(1)).unwrap().to_string(), "0.85");
    }

    #[test]
    fn test_convert_rounds_half_up() {
        let rate = usd_eur(dec!(0.5));
        // 0.01 * 0.5 = 0.005 -> 0.01
        assert_eq!(rate.convert(dec!(0.01)), Some(dec!(0.01)));
        // 0.03 * 0.5 = 0.015 -> 0.02
        assert_eq!(rate.convert(dec!(0.03)), Some(dec!(0.02)));
    }

    #[test]
    fn test_convert_overflow_is_none() {
        let lkr = Rate::new(
            CurrencyPair::new(Currency::Usd, Currency::Lkr),
            dec!(320),
            Provenance::Fallback,
        );
        assert_eq!(lkr.convert(Decimal::MAX), None);
        assert_eq!(lkr.convert(Decimal::from_scientific("1e27").unwrap()), None);
        assert_eq!(
            lkr.convert(dec!(100000000000000000000)).unwrap().to_string(),
            "32000000000000000000000.00"
        );
    }

    #[test]
    fn test_describe() {
        let rate = usd_eur(dec!(0.85));
        assert_eq!(rate.describe(), "1 USD = 0.8500 EUR");

        let yen = Rate::new(
            CurrencyPair::new(Currency::Usd, Currency::Jpy),
            dec!(110),
            Provenance::Live,
        );
        assert_eq!(yen.describe(), "1 USD = 110.0000 JPY");
    }

    #[test]
    fn test_identity_rate() {
        let pair = CurrencyPair::new(Currency::Gbp, Currency::Gbp);
        let rate = Rate::identity(pair);
        assert_eq!(rate.value, Decimal::ONE);
        assert_eq!(rate.provenance, Provenance::Identity);
        assert!(rate.provenance.is_market_data());
        assert!(!Provenance::Synthetic.is_market_data());
    }
}
