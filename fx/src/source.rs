//! Rate resolution with live lookup and static fallback.

use std::sync::Arc;
use std::time::Duration;

use currex_common::{Currency, CurrencyPair, Provenance, Rate};
use tracing::{debug, instrument, warn};

use crate::cache::{CacheStats, RateCache};
use crate::config::FxConfig;
use crate::error::FxResult;
use crate::fallback::FallbackTable;
use crate::provider::{bounded, ensure_positive, RateProvider};

/// Resolves the current rate between two currencies.
///
/// [`RateSource::get_rate`] never fails: provider errors and timeouts are
/// logged and answered from the [`FallbackTable`].
pub struct RateSource {
    provider: Arc<dyn RateProvider>,
    fallback: FallbackTable,
    cache: RateCache,
    use_cache: bool,
    request_timeout: Duration,
}

impl RateSource {
    /// Create a rate source over the given provider.
    pub fn new(provider: Arc<dyn RateProvider>, config: &FxConfig) -> Self {
        Self {
            provider,
            fallback: FallbackTable::builtin(),
            cache: RateCache::with_config(config.cache.clone()),
            use_cache: config.use_cache,
            request_timeout: config.request_timeout,
        }
    }

    /// Get the current rate between two currencies.
    pub async fn get_rate(&self, from: Currency, to: Currency) -> Rate {
        self.resolve(CurrencyPair::new(from, to)).await
    }

    /// Get the current rate for a pair.
    #[instrument(skip(self), fields(pair = %pair))]
    pub async fn resolve(&self, pair: CurrencyPair) -> Rate {
        if pair.is_identity() {
            return Rate::identity(pair);
        }

        if self.use_cache {
            if let Some(cached) = self.cache.get(&pair) {
                debug!("Using cached rate");
                return cached;
            }
        }

        match self.fetch_live(pair).await {
            Ok(rate) => {
                if self.use_cache {
                    self.cache.insert(rate.clone());
                }
                rate
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Using fallback exchange rate"
                );
                self.fallback.rate(pair)
            }
        }
    }

    /// Live lookup only, without fallback.
    pub async fn fetch_live(&self, pair: CurrencyPair) -> FxResult<Rate> {
        let value = bounded(self.request_timeout, self.provider.latest(pair)).await?;
        let value = ensure_positive(pair, value)?;
        debug!(provider = self.provider.name(), rate = %value, "Got live rate");
        Ok(Rate::new(pair, value, Provenance::Live))
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached live rates.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockRateProvider;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn source(provider: Arc<MockRateProvider>, config: FxConfig) -> RateSource {
        RateSource::new(provider, &config)
    }

    #[tokio::test]
    async fn test_same_currency_skips_provider() {
        let provider = Arc::new(MockRateProvider::new());
        let rates = source(provider.clone(), FxConfig::default());

        for currency in Currency::ALL {
            let rate = rates.get_rate(currency, currency).await;
            assert_eq!(rate.value, Decimal::ONE);
            assert_eq!(rate.provenance, Provenance::Identity);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_live_rate_preferred() {
        let provider = Arc::new(MockRateProvider::new());
        provider.set_rate(CurrencyPair::new(Currency::Usd, Currency::Eur), dec!(0.9213));
        let rates = source(provider, FxConfig::default());

        let rate = rates.get_rate(Currency::Usd, Currency::Eur).await;

        assert_eq!(rate.value, dec!(0.9213));
        assert_eq!(rate.provenance, Provenance::Live);
    }

    #[tokio::test]
    async fn test_unavailable_provider_uses_table_exactly() {
        let provider = Arc::new(MockRateProvider::unavailable());
        let rates = source(provider, FxConfig::default());
        let table = FallbackTable::builtin();

        for (pair, expected) in table.pairs() {
            let rate = rates.resolve(pair).await;
            assert_eq!(rate.value, expected, "{}", pair);
            assert_eq!(rate.provenance, Provenance::Fallback);
        }
    }

    #[tokio::test]
    async fn test_missing_pair_in_response_falls_back() {
        // Provider is up but has no quote for the pair
        let provider = Arc::new(MockRateProvider::new());
        let rates = source(provider, FxConfig::default());

        let rate = rates.get_rate(Currency::Gbp, Currency::Usd).await;

        assert_eq!(rate.value, dec!(1.37));
        assert_eq!(rate.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_non_positive_live_rate_falls_back() {
        let provider = Arc::new(MockRateProvider::new());
        provider.set_rate(CurrencyPair::new(Currency::Usd, Currency::Jpy), Decimal::ZERO);
        let rates = source(provider, FxConfig::default());

        let rate = rates.get_rate(Currency::Usd, Currency::Jpy).await;

        assert_eq!(rate.value, dec!(110));
        assert_eq!(rate.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_to_fallback() {
        let pair = CurrencyPair::new(Currency::Usd, Currency::Eur);
        let provider = Arc::new(MockRateProvider::new());
        provider.set_rate(pair, dec!(0.99));
        provider.set_delay(pair, Duration::from_secs(5));

        let config = FxConfig {
            request_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let rates = source(provider, config);

        let started = std::time::Instant::now();
        let rate = rates.resolve(pair).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(rate.value, dec!(0.85));
        assert_eq!(rate.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_live_rates_are_cached() {
        let pair = CurrencyPair::new(Currency::Eur, Currency::Gbp);
        let provider = Arc::new(MockRateProvider::new());
        provider.set_rate(pair, dec!(0.84));
        let rates = source(provider.clone(), FxConfig::default());

        rates.resolve(pair).await;
        let second = rates.resolve(pair).await;

        assert_eq!(second.value, dec!(0.84));
        assert_eq!(provider.calls(), 1);
        assert_eq!(rates.cache_stats().fresh, 1);

        rates.clear_cache();
        rates.resolve(pair).await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_fallback_rates_are_not_cached() {
        let pair = CurrencyPair::new(Currency::Eur, Currency::Gbp);
        let provider = Arc::new(MockRateProvider::unavailable());
        let rates = source(provider.clone(), FxConfig::default());

        rates.resolve(pair).await;
        rates.resolve(pair).await;

        assert_eq!(provider.calls(), 2);
        assert_eq!(rates.cache_stats().entries, 0);
    }
}
