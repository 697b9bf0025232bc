//! CLI configuration: environment defaults overridden by flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use currex_fx::{FxConfig, SameCurrencyPolicy};

/// Environment variable naming the preferences file.
pub const STORE_PATH_ENV: &str = "CURREX_STORE_PATH";

/// Flag overrides applied on top of [`FxConfig::from_env`].
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub timeout_ms: Option<u64>,
    pub same_currency: Option<SameCurrencyPolicy>,
    pub trend_days: Option<u32>,
}

impl Overrides {
    /// Apply the overrides to `config`.
    pub fn apply(&self, mut config: FxConfig) -> FxConfig {
        if let Some(url) = &self.api_base {
            config.api_base_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = self.same_currency {
            config.same_currency = policy;
        }
        if let Some(days) = self.trend_days {
            config.trend_days = days;
        }
        config
    }
}

/// Where preferences are stored: the flag, then `CURREX_STORE_PATH`, then
/// the platform data directory.
pub fn store_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(STORE_PATH_ENV).map(PathBuf::from))
        .or_else(|| dirs::data_dir().map(|dir| dir.join("currex").join("preferences.json")))
        .ok_or_else(|| anyhow!("no data directory available; pass --store"))
}
