//! Built-in fallback rate table.
//!
//! Hand-authored rates used when the live provider is unreachable. Each
//! direction is stored independently and the two are not exact
//! reciprocals (USD→EUR is 0.85 while EUR→USD is 1.18).

use currex_common::{Currency, CurrencyPair, Provenance, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

/// One table row: a base currency and its quotes.
pub type Row = (Currency, &'static [(Currency, Decimal)]);

use Currency::{Aud, Cad, Chf, Cny, Eur, Gbp, Inr, Jpy, Lkr, Usd};

#[rustfmt::skip]
static BUILTIN: &[Row] = &[
    (Usd, &[(Eur, dec!(0.85)), (Gbp, dec!(0.73)), (Jpy, dec!(110)), (Lkr, dec!(320)), (Inr, dec!(74)), (Cad, dec!(1.25)), (Aud, dec!(1.35)), (Chf, dec!(0.92)), (Cny, dec!(6.45))]),
    (Eur, &[(Usd, dec!(1.18)), (Gbp, dec!(0.86)), (Jpy, dec!(129)), (Lkr, dec!(377)), (Inr, dec!(87)), (Cad, dec!(1.47)), (Aud, dec!(1.59)), (Chf, dec!(1.08)), (Cny, dec!(7.59))]),
    (Gbp, &[(Usd, dec!(1.37)), (Eur, dec!(1.16)), (Jpy, dec!(151)), (Lkr, dec!(438)), (Inr, dec!(101)), (Cad, dec!(1.71)), (Aud, dec!(1.85)), (Chf, dec!(1.26)), (Cny, dec!(8.83))]),
    (Jpy, &[(Usd, dec!(0.0091)), (Eur, dec!(0.0077)), (Gbp, dec!(0.0066)), (Lkr, dec!(2.91)), (Inr, dec!(0.67)), (Cad, dec!(0.011)), (Aud, dec!(0.012)), (Chf, dec!(0.0084)), (Cny, dec!(0.059))]),
    (Lkr, &[(Usd, dec!(0.0031)), (Eur, dec!(0.0027)), (Gbp, dec!(0.0023)), (Jpy, dec!(0.34)), (Inr, dec!(0.23)), (Cad, dec!(0.0039)), (Aud, dec!(0.0042)), (Chf, dec!(0.0029)), (Cny, dec!(0.020))]),
    (Inr, &[(Usd, dec!(0.014)), (Eur, dec!(0.011)), (Gbp, dec!(0.0099)), (Jpy, dec!(1.49)), (Lkr, dec!(4.32)), (Cad, dec!(0.017)), (Aud, dec!(0.018)), (Chf, dec!(0.012)), (Cny, dec!(0.087))]),
    (Cad, &[(Usd, dec!(0.80)), (Eur, dec!(0.68)), (Gbp, dec!(0.58)), (Jpy, dec!(88)), (Lkr, dec!(256)), (Inr, dec!(59)), (Aud, dec!(1.08)), (Chf, dec!(0.74)), (Cny, dec!(5.16))]),
    (Aud, &[(Usd, dec!(0.74)), (Eur, dec!(0.63)), (Gbp, dec!(0.54)), (Jpy, dec!(81)), (Lkr, dec!(237)), (Inr, dec!(55)), (Cad, dec!(0.93)), (Chf, dec!(0.68)), (Cny, dec!(4.78))]),
    (Chf, &[(Usd, dec!(1.09)), (Eur, dec!(0.93)), (Gbp, dec!(0.79)), (Jpy, dec!(119)), (Lkr, dec!(348)), (Inr, dec!(80)), (Cad, dec!(1.36)), (Aud, dec!(1.47)), (Cny, dec!(7.02))]),
    (Cny, &[(Usd, dec!(0.15)), (Eur, dec!(0.13)), (Gbp, dec!(0.11)), (Jpy, dec!(17)), (Lkr, dec!(49.6)), (Inr, dec!(11.5)), (Cad, dec!(0.19)), (Aud, dec!(0.21)), (Chf, dec!(0.14))]),
];

/// Static `from → to → rate` table.
#[derive(Debug, Clone, Copy)]
pub struct FallbackTable {
    rows: &'static [Row],
}

impl FallbackTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        Self { rows: BUILTIN }
    }

    /// A table over custom rows.
    pub fn from_rows(rows: &'static [Row]) -> Self {
        Self { rows }
    }

    /// Table entry for a pair, if defined.
    pub fn lookup(&self, pair: CurrencyPair) -> Option<Decimal> {
        self.rows
            .iter()
            .find(|(from, _)| *from == pair.from)
            .and_then(|(_, quotes)| quotes.iter().find(|(to, _)| *to == pair.to))
            .map(|(_, rate)| *rate)
    }

    /// Resolve a pair, never failing.
    ///
    /// Same-currency pairs resolve to 1. Pairs missing from the table also
    /// resolve to 1, an approximation rather than an error.
    pub fn rate(&self, pair: CurrencyPair) -> Rate {
        if pair.is_identity() {
            return Rate::identity(pair);
        }

        let value = self.lookup(pair).unwrap_or_else(|| {
            warn!(pair = %pair, "Pair missing from fallback table, approximating with 1");
            Decimal::ONE
        });
        Rate::new(pair, value, Provenance::Fallback)
    }

    /// Every pair with a table entry.
    pub fn pairs(&self) -> impl Iterator<Item = (CurrencyPair, Decimal)> + '_ {
        self.rows.iter().flat_map(|(from, quotes)| {
            quotes
                .iter()
                .map(move |(to, rate)| (CurrencyPair::new(*from, *to), *rate))
        })
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::builtin()
    }
}
