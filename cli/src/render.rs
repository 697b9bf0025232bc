//! Plain-text rendering of results.

use currex_common::{format_date, RATE_DISPLAY_PLACES};
use currex_fx::{Conversion, RateComparison, RatePoint};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Widest bar drawn by [`chart`].
pub const CHART_WIDTH: usize = 40;

const BAR: char = '█';

/// `100 USD = 85.00 EUR`
pub fn conversion_line(conversion: &Conversion) -> String {
    let pair = conversion.pair();
    format!(
        "{} {} = {} {}",
        conversion.amount, pair.from, conversion.converted, pair.to
    )
}

/// Signed change with percentage, e.g. `+0.0800 (+10.00%)`.
pub fn change_line(comparison: &RateComparison) -> String {
    let sign = if comparison.change.is_sign_negative() { "" } else { "+" };
    format!(
        "{sign}{:.prec$} ({sign}{:.2}%)",
        comparison.change,
        comparison.change_pct,
        prec = RATE_DISPLAY_PLACES
    )
}

/// One line per point: date, rate and a bar scaled between the lowest and
/// highest rate in the series.
pub fn chart(points: &[RatePoint], width: usize) -> Vec<String> {
    let width = width.max(1);
    let min = points.iter().map(|p| p.rate).min().unwrap_or_default();
    let max = points.iter().map(|p| p.rate).max().unwrap_or_default();
    let span = max - min;

    points
        .iter()
        .map(|point| {
            let len = if span.is_zero() {
                width
            } else {
                let scaled = (point.rate - min) / span * Decimal::from(width - 1);
                1 + scaled.round().to_usize().unwrap_or(0)
            };
            format!(
                "{}  {:>12.prec$}  {}",
                format_date(point.date),
                point.rate,
                BAR.to_string().repeat(len),
                prec = RATE_DISPLAY_PLACES
            )
        })
        .collect()
}
