//! FX core configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use currex_common::constants;

use crate::cache::RateCacheConfig;

/// Default live provider.
pub const DEFAULT_API_BASE_URL: &str = "https://api.frankfurter.app";

/// What to do when both sides of a conversion are the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameCurrencyPolicy {
    /// Convert at rate 1.
    #[default]
    Identity,
    /// Fail with `SameCurrency`.
    Reject,
}

impl fmt::Display for SameCurrencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameCurrencyPolicy::Identity => f.write_str("identity"),
            SameCurrencyPolicy::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for SameCurrencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" => Ok(SameCurrencyPolicy::Identity),
            "reject" => Ok(SameCurrencyPolicy::Reject),
            other => Err(format!("unknown same-currency policy: {}", other)),
        }
    }
}

/// Configuration for rate resolution, conversion and historical lookup.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Base URL of the Frankfurter-compatible rate API.
    pub api_base_url: String,
    /// Upper bound on a single provider call.
    pub request_timeout: Duration,
    /// Whether to cache live rates.
    pub use_cache: bool,
    /// Cache configuration.
    pub cache: RateCacheConfig,
    /// Same-currency conversion policy.
    pub same_currency: SameCurrencyPolicy,
    /// Days covered by the trend series.
    pub trend_days: u32,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: constants::request_timeout(),
            use_cache: true,
            cache: RateCacheConfig::default(),
            same_currency: SameCurrencyPolicy::default(),
            trend_days: constants::TREND_DAYS,
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CURREX_API_BASE") {
            config.api_base_url = url;
        }

        if let Ok(ms) = std::env::var("CURREX_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.request_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(ms) = std::env::var("CURREX_CACHE_TTL_MS") {
            if let Some(ttl) = ms.parse::<i64>().ok().and_then(chrono::Duration::try_milliseconds) {
                config.use_cache = ttl > chrono::Duration::zero();
                config.cache.ttl = ttl;
            }
        }

        if let Ok(days) = std::env::var("CURREX_TREND_DAYS") {
            if let Ok(days) = days.parse() {
                config.trend_days = days;
            }
        }

        if let Ok(policy) = std::env::var("CURREX_SAME_CURRENCY") {
            if let Ok(policy) = policy.parse() {
                config.same_currency = policy;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err("API base URL cannot be empty".to_string());
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(format!("API base URL must be http(s): {}", self.api_base_url));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        if self.trend_days == 0 {
            return Err("Trend must cover at least one day".to_string());
        }

        if self.trend_days > constants::MAX_TREND_DAYS {
            return Err(format!(
                "Trend cannot cover more than {} days",
                constants::MAX_TREND_DAYS
            ));
        }

        if self.use_cache && self.cache.ttl <= chrono::Duration::zero() {
            return Err("Cache TTL must be positive when caching is enabled".to_string());
        }

        Ok(())
    }
}
