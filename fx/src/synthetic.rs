//! Deterministic stand-in rates for offline trend charts.

use chrono::NaiveDate;
use currex_common::{format_date, CurrencyPair};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::fallback::FallbackTable;

/// Largest deviation from the anchor rate, in basis points.
const MAX_JITTER_BPS: i64 = 250;

/// Decimal places kept on generated rates.
const SYNTHETIC_PLACES: u32 = 4;

/// Generates a plausible rate per day for one pair.
///
/// Values stay within ±2.5% of the fallback table rate, rounded to four
/// places, and depend only on the pair and the date.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticRates {
    pair: CurrencyPair,
    anchor: Decimal,
}

impl SyntheticRates {
    /// Anchor the generator on the fallback rate for `pair`.
    pub fn new(pair: CurrencyPair, fallback: &FallbackTable) -> Self {
        Self {
            pair,
            anchor: fallback.rate(pair).value,
        }
    }

    /// The rate the series varies around.
    pub fn anchor(&self) -> Decimal {
        self.anchor
    }

    /// Generated rate for `date`.
    pub fn rate_on(&self, date: NaiveDate) -> Decimal {
        if self.pair.is_identity() {
            return Decimal::ONE;
        }

        let mut rng = StdRng::seed_from_u64(self.seed(date));
        let jitter_bps = rng.gen_range(-MAX_JITTER_BPS..=MAX_JITTER_BPS);
        let factor = Decimal::ONE + Decimal::new(jitter_bps, 4);
        (self.anchor * factor).round_dp(SYNTHETIC_PLACES)
    }

    fn seed(&self, date: NaiveDate) -> u64 {
        let digest = Sha256::digest(format!("{}:{}", self.pair, format_date(date)).as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}
