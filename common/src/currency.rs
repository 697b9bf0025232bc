//! Currency codes and currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrencyError;

/// ISO 4217 currency code from the supported set.
///
/// Only these codes can be converted. Anything else is rejected at parse
/// time, so rate resolution never sees an unknown code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Lkr,
    Inr,
    Cad,
    Aud,
    Chf,
    Cny,
}

impl Currency {
    /// Every supported currency, in display order.
    pub const ALL: [Currency; 10] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Lkr,
        Currency::Inr,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
        Currency::Cny,
    ];

    /// Get the currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Lkr => "LKR",
            Currency::Inr => "INR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Cny => "CNY",
        }
    }

    /// Flag shown next to the code in listings.
    pub fn flag(&self) -> &'static str {
        match self {
            Currency::Usd => "🇺🇸",
            Currency::Eur => "🇪🇺",
            Currency::Gbp => "🇬🇧",
            Currency::Jpy => "🇯🇵",
            Currency::Lkr => "🇱🇰",
            Currency::Inr => "🇮🇳",
            Currency::Cad => "🇨🇦",
            Currency::Aud => "🇦🇺",
            Currency::Chf => "🇨🇭",
            Currency::Cny => "🇨🇳",
        }
    }

    /// Parse a currency code, accepting any letter case.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let upper = code.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == upper)
            .ok_or(CurrencyError::Unsupported(upper))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An ordered (from, to) currency pair.
///
/// The canonical text form is `FROM-TO`, which is also how favorites are
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyPair {
    /// Currency being converted from.
    pub from: Currency,
    /// Currency being converted to.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Whether both sides are the same currency.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for CurrencyPair {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once('-')
            .ok_or_else(|| CurrencyError::InvalidPair(s.to_string()))?;
        Ok(Self::new(from.parse()?, to.parse()?))
    }
}

impl Serialize for CurrencyPair {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurrencyPair {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
