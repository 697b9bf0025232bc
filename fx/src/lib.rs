//! Currex FX Core
//!
//! Rate resolution and currency conversion.
//!
//! # Features
//!
//! - Live rates from a Frankfurter-compatible REST API, bounded by a timeout
//! - Built-in fallback table when the provider is unreachable
//! - Short-lived caching of live rates
//! - Conversion with validation, half-up rounding and last-response-wins
//!   ordering for rapid successive requests
//! - Historical point lookups and date-range series for trend charts, with
//!   deterministic synthetic data when offline
//!
//! Every rate carries a [`Provenance`](currex_common::Provenance) so callers
//! can tell live data from fallback or synthetic values.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use currex_common::Currency;
//! use currex_fx::{AppContext, ConversionRequest, FxConfig};
//! use currex_store::MemoryStore;
//!
//! let ctx = AppContext::with_live_provider(FxConfig::default(), Arc::new(MemoryStore::new()))?;
//!
//! let rate = ctx.rates().get_rate(Currency::Usd, Currency::Eur).await;
//! let request = ConversionRequest::user(dec!(100), Currency::Usd, Currency::Eur);
//! let conversion = ctx.engine().convert(request).await?;
//! println!("{} ({})", conversion.converted, conversion.rate.describe());
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod frankfurter;
pub mod historical;
pub mod provider;
pub mod sequence;
pub mod source;
pub mod synthetic;

pub use cache::RateCache;
pub use config::{FxConfig, SameCurrencyPolicy};
pub use context::{AppContext, DEFAULT_PAIR};
pub use conversion::{parse_amount, Conversion, ConversionRequest, ConversionTrigger};
pub use engine::ConversionEngine;
pub use error::{FxError, FxResult};
pub use fallback::FallbackTable;
pub use frankfurter::FrankfurterProvider;
pub use historical::{HistoricalLookup, RateComparison, RatePoint, RateSeries};
pub use provider::{OfflineProvider, RateProvider};
pub use sequence::RequestSequencer;
pub use source::RateSource;
pub use synthetic::SyntheticRates;
