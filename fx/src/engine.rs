//! Conversion engine.

use std::sync::Arc;

use currex_common::Rate;
use currex_store::PreferenceStore;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::SameCurrencyPolicy;
use crate::conversion::{validate_amount, Conversion, ConversionRequest, ConversionTrigger};
use crate::error::{FxError, FxResult};
use crate::sequence::RequestSequencer;
use crate::source::RateSource;

/// Validates requests, resolves rates and computes converted amounts.
pub struct ConversionEngine {
    source: Arc<RateSource>,
    preferences: Arc<PreferenceStore>,
    sequencer: RequestSequencer,
    latest: RwLock<Option<Conversion>>,
    same_currency: SameCurrencyPolicy,
}

impl ConversionEngine {
    /// Create a new conversion engine.
    pub fn new(
        source: Arc<RateSource>,
        preferences: Arc<PreferenceStore>,
        same_currency: SameCurrencyPolicy,
    ) -> Self {
        Self {
            source,
            preferences,
            sequencer: RequestSequencer::new(),
            latest: RwLock::new(None),
            same_currency,
        }
    }

    /// Convert an amount.
    ///
    /// Fails only on invalid input; rate resolution always succeeds. A
    /// user-initiated conversion also records its currencies as preferred.
    pub async fn convert(&self, request: ConversionRequest) -> FxResult<Conversion> {
        let sequence = self.sequencer.next();
        let conversion = self.execute(request, sequence).await?;
        self.record_preference(&conversion);
        Ok(conversion)
    }

    /// Convert with last-response-wins ordering.
    ///
    /// Returns `Ok(None)` when a request issued later has already been
    /// applied; the stale result is dropped and preferences are untouched.
    pub async fn submit(&self, request: ConversionRequest) -> FxResult<Option<Conversion>> {
        let sequence = self.sequencer.next();
        let conversion = self.execute(request, sequence).await?;

        if !self.sequencer.try_apply(sequence) {
            debug!(
                sequence,
                last_applied = self.sequencer.last_applied(),
                "Discarding stale conversion"
            );
            return Ok(None);
        }

        self.record_preference(&conversion);
        *self.latest.write() = Some(conversion.clone());
        Ok(Some(conversion))
    }

    /// Convert the same amount with the currencies exchanged.
    pub async fn swap(&self, request: &ConversionRequest) -> FxResult<Option<Conversion>> {
        self.submit(request.swapped()).await
    }

    /// Most recent conversion applied through [`ConversionEngine::submit`].
    pub fn latest(&self) -> Option<Conversion> {
        self.latest.read().clone()
    }

    #[instrument(skip(self, request), fields(
        pair = %request.pair,
        amount = %request.amount,
        trigger = ?request.trigger
    ))]
    async fn execute(&self, request: ConversionRequest, sequence: u64) -> FxResult<Conversion> {
        let amount = validate_amount(request.amount)?;

        let rate = if request.pair.is_identity() {
            match self.same_currency {
                SameCurrencyPolicy::Reject => {
                    return Err(FxError::SameCurrency(request.pair.from));
                }
                SameCurrencyPolicy::Identity => Rate::identity(request.pair),
            }
        } else {
            self.source.resolve(request.pair).await
        };

        let conversion = Conversion::new(sequence, amount, rate, request.trigger)?;

        info!(
            conversion_id = %conversion.id,
            converted = %conversion.converted,
            rate = %conversion.rate.value,
            provenance = %conversion.rate.provenance,
            "Conversion completed"
        );

        Ok(conversion)
    }

    fn record_preference(&self, conversion: &Conversion) {
        if conversion.trigger != ConversionTrigger::User {
            return;
        }

        let pair = conversion.pair();
        if let Err(e) = self.preferences.save_preferred_currencies(pair.from, pair.to) {
            warn!(pair = %pair, error = %e, "Failed to save preferred currencies");
        }
    }
}
