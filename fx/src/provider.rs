//! Rate provider trait and helpers.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use currex_common::CurrencyPair;
use rust_decimal::Decimal;

use crate::error::{FxError, FxResult};

/// Daily rates keyed by date, ascending.
pub type DailyRates = BTreeMap<NaiveDate, Decimal>;

/// Source of live exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Latest rate for a pair.
    async fn latest(&self, pair: CurrencyPair) -> FxResult<Decimal>;

    /// Rate for a pair on a past date.
    async fn on_date(&self, pair: CurrencyPair, date: NaiveDate) -> FxResult<Decimal>;

    /// Rates for every available date in `start..=end`.
    async fn range(&self, pair: CurrencyPair, start: NaiveDate, end: NaiveDate)
        -> FxResult<DailyRates>;
}

/// Run a provider call under a timeout; expiry counts as a provider failure.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> FxResult<T>
where
    F: Future<Output = FxResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(FxError::ProviderUnavailable(format!(
            "no response within {}ms",
            timeout.as_millis()
        ))),
    }
}

/// Reject zero or negative rates.
pub(crate) fn ensure_positive(pair: CurrencyPair, value: Decimal) -> FxResult<Decimal> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(FxError::ProviderUnavailable(format!(
            "non-positive rate {} for {}",
            value, pair
        )))
    }
}

/// Provider for running without network access. Every call fails, so
/// current rates come from the fallback table and series are synthetic.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl RateProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn latest(&self, _pair: CurrencyPair) -> FxResult<Decimal> {
        Err(FxError::ProviderUnavailable("offline mode".to_string()))
    }

    async fn on_date(&self, _pair: CurrencyPair, _date: NaiveDate) -> FxResult<Decimal> {
        Err(FxError::ProviderUnavailable("offline mode".to_string()))
    }

    async fn range(
        &self,
        _pair: CurrencyPair,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> FxResult<DailyRates> {
        Err(FxError::ProviderUnavailable("offline mode".to_string()))
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateProvider;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory provider with controllable failures and latency.
    #[derive(Default)]
    pub struct MockRateProvider {
        latest: DashMap<CurrencyPair, Decimal>,
        history: DashMap<(CurrencyPair, NaiveDate), Decimal>,
        delays: DashMap<CurrencyPair, Duration>,
        unavailable: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockRateProvider {
        /// Create a new mock provider.
        pub fn new() -> Self {
            Self::default()
        }

        /// A provider whose every call fails.
        pub fn unavailable() -> Self {
            let provider = Self::new();
            provider.set_unavailable(true);
            provider
        }

        /// Set the latest rate for a pair.
        pub fn set_rate(&self, pair: CurrencyPair, rate: Decimal) {
            self.latest.insert(pair, rate);
        }

        /// Set the rate for a pair on a date.
        pub fn set_historical(&self, pair: CurrencyPair, date: NaiveDate, rate: Decimal) {
            self.history.insert((pair, date), rate);
        }

        /// Delay every call for a pair.
        pub fn set_delay(&self, pair: CurrencyPair, delay: Duration) {
            self.delays.insert(pair, delay);
        }

        /// Make every call fail.
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Number of calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn enter(&self, pair: CurrencyPair) -> FxResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays.get(&pair).map(|d| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(FxError::ProviderUnavailable("mock offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn latest(&self, pair: CurrencyPair) -> FxResult<Decimal> {
            self.enter(pair).await?;
            self.latest
                .get(&pair)
                .map(|r| *r)
                .ok_or_else(|| FxError::ProviderUnavailable(format!("no rate for {}", pair)))
        }

        async fn on_date(&self, pair: CurrencyPair, date: NaiveDate) -> FxResult<Decimal> {
            self.enter(pair).await?;
            self.history
                .get(&(pair, date))
                .map(|r| *r)
                .ok_or_else(|| {
                    FxError::ProviderUnavailable(format!("no rate for {} on {}", pair, date))
                })
        }

        async fn range(
            &self,
            pair: CurrencyPair,
            start: NaiveDate,
            end: NaiveDate,
        ) -> FxResult<DailyRates> {
            self.enter(pair).await?;
            Ok(self
                .history
                .iter()
                .filter(|e| e.key().0 == pair && e.key().1 >= start && e.key().1 <= end)
                .map(|e| (e.key().1, *e.value()))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use currex_common::Currency;
    use rust_decimal_macros::dec;

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::Usd, Currency::Eur)
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new();
        provider.set_rate(usd_eur(), dec!(0.92));

        assert_eq!(provider.latest(usd_eur()).await.unwrap(), dec!(0.92));
        assert!(provider.latest(usd_eur().inverse()).await.is_err());
        assert_eq!(provider.calls(), 2);

        provider.set_unavailable(true);
        assert!(matches!(
            provider.latest(usd_eur()).await,
            Err(FxError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_provider_always_fails() {
        let provider = OfflineProvider;
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        assert!(provider.latest(usd_eur()).await.is_err());
        assert!(provider.on_date(usd_eur(), date).await.is_err());
        assert!(provider.range(usd_eur(), date, date).await.is_err());
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, FxError>(dec!(1))
        };

        let result = bounded(Duration::from_millis(20), slow).await;
        assert!(matches!(result, Err(FxError::ProviderUnavailable(msg)) if msg.contains("20ms")));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(usd_eur(), dec!(0.85)).is_ok());
        assert!(ensure_positive(usd_eur(), Decimal::ZERO).is_err());
        assert!(ensure_positive(usd_eur(), dec!(-1)).is_err());
    }
}
