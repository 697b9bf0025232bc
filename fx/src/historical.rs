//! Historical rates and trend series.

use std::collections::btree_map;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use currex_common::{days_before, is_future, today, Currency, CurrencyPair, Provenance, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::FxConfig;
use crate::error::{FxError, FxResult};
use crate::fallback::FallbackTable;
use crate::provider::{bounded, ensure_positive, RateProvider};
use crate::synthetic::SyntheticRates;

/// One day of a rate series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: Decimal,
    pub provenance: Provenance,
}

/// Daily rates for a pair, ascending by date.
///
/// Points are produced on demand. Live series are backed by the fetched
/// response; synthetic and identity series are generated per day.
#[derive(Debug)]
pub struct RateSeries {
    pair: CurrencyPair,
    provenance: Provenance,
    points: Points,
}

#[derive(Debug)]
enum Points {
    Fetched(btree_map::IntoIter<NaiveDate, Decimal>),
    Generated {
        next: NaiveDate,
        remaining: usize,
        synth: SyntheticRates,
    },
}

impl RateSeries {
    fn fetched(pair: CurrencyPair, rates: btree_map::BTreeMap<NaiveDate, Decimal>) -> Self {
        Self {
            pair,
            provenance: Provenance::Live,
            points: Points::Fetched(rates.into_iter()),
        }
    }

    fn generated(
        pair: CurrencyPair,
        provenance: Provenance,
        start: NaiveDate,
        end: NaiveDate,
        synth: SyntheticRates,
    ) -> Self {
        let days = (end - start).num_days().max(-1) + 1;
        Self {
            pair,
            provenance,
            points: Points::Generated {
                next: start,
                remaining: days as usize,
                synth,
            },
        }
    }

    /// The pair this series describes.
    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Provenance shared by every point.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Whether the points were generated rather than fetched.
    pub fn is_synthetic(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }
}

impl Iterator for RateSeries {
    type Item = RatePoint;

    fn next(&mut self) -> Option<RatePoint> {
        let provenance = self.provenance;
        match &mut self.points {
            Points::Fetched(iter) => iter.next().map(|(date, rate)| RatePoint {
                date,
                rate,
                provenance,
            }),
            Points::Generated {
                next,
                remaining,
                synth,
            } => {
                if *remaining == 0 {
                    return None;
                }
                let date = *next;
                *remaining -= 1;
                if let Some(following) = date.succ_opt() {
                    *next = following;
                } else {
                    *remaining = 0;
                }
                Some(RatePoint {
                    date,
                    rate: synth.rate_on(date),
                    provenance,
                })
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.points {
            Points::Fetched(iter) => iter.size_hint(),
            Points::Generated { remaining, .. } => (*remaining, Some(*remaining)),
        }
    }
}

/// Change between a historical and a current rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateComparison {
    pub pair: CurrencyPair,
    pub historical: Decimal,
    pub historical_date: Option<NaiveDate>,
    pub current: Decimal,
    /// `current - historical`.
    pub change: Decimal,
    /// Change relative to the historical rate, in percent, two places.
    pub change_pct: Decimal,
}

impl RateComparison {
    /// Compare `current` against `historical`.
    pub fn compare(historical: &Rate, current: &Rate) -> Self {
        let change = current.value - historical.value;
        let change_pct = (change * Decimal::ONE_HUNDRED)
            .checked_div(historical.value)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2);

        Self {
            pair: historical.pair,
            historical: historical.value,
            historical_date: historical.as_of,
            current: current.value,
            change,
            change_pct,
        }
    }
}

/// Looks up rates for past dates.
///
/// Single-date lookups are live only and surface failures. Ranges fall back
/// to a synthetic series so a chart always has something to draw.
pub struct HistoricalLookup {
    provider: Arc<dyn RateProvider>,
    fallback: FallbackTable,
    request_timeout: Duration,
    trend_days: u32,
}

impl HistoricalLookup {
    /// Create a lookup over the given provider.
    pub fn new(provider: Arc<dyn RateProvider>, config: &FxConfig) -> Self {
        Self {
            provider,
            fallback: FallbackTable::builtin(),
            request_timeout: config.request_timeout,
            trend_days: config.trend_days,
        }
    }

    /// Rate between two currencies on `date`.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, date: NaiveDate, from: Currency, to: Currency) -> FxResult<Rate> {
        let pair = CurrencyPair::new(from, to);

        if is_future(date) {
            return Err(FxError::HistoricalUnavailable {
                pair,
                date,
                reason: "date is in the future".to_string(),
            });
        }

        if pair.is_identity() {
            return Ok(Rate::identity(pair).on(date));
        }

        let value = bounded(self.request_timeout, self.provider.on_date(pair, date))
            .await
            .and_then(|value| ensure_positive(pair, value))
            .map_err(|e| {
                warn!(provider = self.provider.name(), error = %e, "Historical lookup failed");
                FxError::HistoricalUnavailable {
                    pair,
                    date,
                    reason: e.to_string(),
                }
            })?;

        debug!(rate = %value, "Got historical rate");
        Ok(Rate::new(pair, value, Provenance::Live).on(date))
    }

    /// Daily rates for `start..=end`.
    ///
    /// An `end` after today is clamped to today. When the provider fails or
    /// returns nothing, the series is synthesized from the fallback table.
    #[instrument(skip(self))]
    pub async fn range(
        &self,
        from: Currency,
        to: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FxResult<RateSeries> {
        if start > end || is_future(start) {
            return Err(FxError::InvalidDateRange { start, end });
        }

        let pair = CurrencyPair::new(from, to);
        let end = end.min(today());
        let synth = SyntheticRates::new(pair, &self.fallback);

        if pair.is_identity() {
            return Ok(RateSeries::generated(pair, Provenance::Identity, start, end, synth));
        }

        match bounded(self.request_timeout, self.provider.range(pair, start, end)).await {
            Ok(mut rates) => {
                rates.retain(|_, rate| *rate > Decimal::ZERO);
                if !rates.is_empty() {
                    debug!(points = rates.len(), "Got live rate series");
                    return Ok(RateSeries::fetched(pair, rates));
                }
                warn!(
                    provider = self.provider.name(),
                    "Provider returned no rates, using synthetic series"
                );
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Using synthetic rate series"
                );
            }
        }

        Ok(RateSeries::generated(pair, Provenance::Synthetic, start, end, synth))
    }

    /// Series for the configured number of days, ending today.
    ///
    /// A window reaching before the earliest representable date is
    /// `InvalidDateRange`.
    pub async fn trend(&self, from: Currency, to: Currency) -> FxResult<RateSeries> {
        let end = today();
        let start = days_before(end, i64::from(self.trend_days.max(1)) - 1).ok_or(
            FxError::InvalidDateRange {
                start: NaiveDate::MIN,
                end,
            },
        )?;
        self.range(from, to, start, end).await
    }

    /// Days covered by [`HistoricalLookup::trend`].
    pub fn trend_days(&self) -> u32 {
        self.trend_days
    }
}
