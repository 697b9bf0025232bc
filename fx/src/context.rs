//! Application context wiring the FX components together.

use std::sync::Arc;

use currex_common::{Currency, CurrencyPair};
use currex_store::{KeyValueStore, PreferenceStore};
use tracing::info;

use crate::config::FxConfig;
use crate::engine::ConversionEngine;
use crate::error::{FxError, FxResult};
use crate::frankfurter::FrankfurterProvider;
use crate::historical::HistoricalLookup;
use crate::provider::RateProvider;
use crate::source::RateSource;

/// Pair offered when no preference has been saved yet.
pub const DEFAULT_PAIR: CurrencyPair = CurrencyPair {
    from: Currency::Usd,
    to: Currency::Eur,
};

/// Shared state for one running application.
pub struct AppContext {
    config: FxConfig,
    rates: Arc<RateSource>,
    engine: ConversionEngine,
    history: HistoricalLookup,
    preferences: Arc<PreferenceStore>,
}

impl AppContext {
    /// Build a context over an explicit provider and key-value store.
    pub fn new(
        config: FxConfig,
        provider: Arc<dyn RateProvider>,
        kv: Arc<dyn KeyValueStore>,
    ) -> FxResult<Self> {
        config.validate().map_err(FxError::Config)?;

        let preferences = Arc::new(PreferenceStore::load(kv)?);
        let rates = Arc::new(RateSource::new(provider.clone(), &config));
        let engine = ConversionEngine::new(rates.clone(), preferences.clone(), config.same_currency);
        let history = HistoricalLookup::new(provider, &config);

        info!(
            api_base_url = %config.api_base_url,
            timeout_ms = config.request_timeout.as_millis() as u64,
            cache = config.use_cache,
            same_currency = %config.same_currency,
            "FX context ready"
        );

        Ok(Self {
            config,
            rates,
            engine,
            history,
            preferences,
        })
    }

    /// Build a context backed by the Frankfurter API at `config.api_base_url`.
    pub fn with_live_provider(config: FxConfig, kv: Arc<dyn KeyValueStore>) -> FxResult<Self> {
        config.validate().map_err(FxError::Config)?;
        let provider = FrankfurterProvider::new(config.api_base_url.clone(), config.request_timeout)?;
        Self::new(config, Arc::new(provider), kv)
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateSource {
        &self.rates
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    pub fn history(&self) -> &HistoricalLookup {
        &self.history
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Saved preferred pair, or USD to EUR.
    pub fn default_pair(&self) -> CurrencyPair {
        self.preferences
            .load_preferred_currencies()
            .unwrap_or(DEFAULT_PAIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionRequest;
    use crate::provider::MockRateProvider;
    use currex_store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn context(kv: Arc<MemoryStore>) -> AppContext {
        AppContext::new(
            FxConfig::default(),
            Arc::new(MockRateProvider::unavailable()),
            kv,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FxConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };

        let result = AppContext::new(
            config,
            Arc::new(MockRateProvider::new()),
            Arc::new(MemoryStore::new()),
        );

        assert!(matches!(result, Err(FxError::Config(_))));
    }

    #[tokio::test]
    async fn test_default_pair_follows_user_conversions() {
        let kv = Arc::new(MemoryStore::new());
        let ctx = context(kv.clone());
        assert_eq!(ctx.default_pair(), DEFAULT_PAIR);

        ctx.engine()
            .convert(ConversionRequest::user(dec!(5), Currency::Gbp, Currency::Lkr))
            .await
            .unwrap();

        // A fresh context over the same store sees the saved pair
        let reopened = context(kv);
        assert_eq!(
            reopened.default_pair(),
            CurrencyPair::new(Currency::Gbp, Currency::Lkr)
        );
    }

    #[tokio::test]
    async fn test_components_share_provider() {
        let provider = Arc::new(MockRateProvider::new());
        let pair = CurrencyPair::new(Currency::Usd, Currency::Chf);
        provider.set_rate(pair, dec!(0.88));
        let ctx = AppContext::new(
            FxConfig::default(),
            provider.clone(),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        let rate = ctx.rates().resolve(pair).await;
        let conversion = ctx
            .engine()
            .convert(ConversionRequest::auto(dec!(10), Currency::Usd, Currency::Chf))
            .await
            .unwrap();

        assert_eq!(rate.value, dec!(0.88));
        assert_eq!(conversion.converted, dec!(8.80));
        // Second lookup came from the shared cache
        assert_eq!(provider.calls(), 1);
    }
}
