//! Short-lived cache of live rates.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use currex_common::{constants, CurrencyPair, Rate};
use dashmap::DashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct Slot {
    rate: Rate,
    expires_at: DateTime<Utc>,
    /// Insertion order, used to pick an eviction victim.
    stamp: u64,
}

impl Slot {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Cache sizing and lifetime.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a live rate is reused.
    pub ttl: Duration,
    /// Most pairs held at once.
    pub capacity: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_std(constants::cache_ttl()).unwrap_or(Duration::MAX),
            capacity: 256,
        }
    }
}

/// Live rates keyed by pair. Entries expire after the configured TTL; when
/// full, stale entries go first, then the oldest insertion.
pub struct RateCache {
    slots: DashMap<CurrencyPair, Slot>,
    config: RateCacheConfig,
    stamps: AtomicU64,
}

impl RateCache {
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            slots: DashMap::new(),
            config,
            stamps: AtomicU64::new(0),
        }
    }

    /// Fresh rate for `pair`, dropping it if it has expired.
    pub fn get(&self, pair: &CurrencyPair) -> Option<Rate> {
        let now = Utc::now();
        let fresh = self
            .slots
            .get(pair)
            .map(|slot| slot.is_fresh(now).then(|| slot.rate.clone()));

        match fresh {
            Some(Some(rate)) => Some(rate),
            Some(None) => {
                debug!(pair = %pair, "Cached rate expired");
                self.slots.remove_if(pair, |_, slot| !slot.is_fresh(now));
                None
            }
            None => None,
        }
    }

    /// Store a live rate under its pair.
    pub fn insert(&self, rate: Rate) {
        if !self.slots.contains_key(&rate.pair) && self.slots.len() >= self.config.capacity {
            self.make_room();
        }

        let expires_at = Utc::now()
            .checked_add_signed(self.config.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let slot = Slot {
            expires_at,
            stamp: self.stamps.fetch_add(1, Ordering::Relaxed),
            rate,
        };
        self.slots.insert(slot.rate.pair, slot);
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every expired entry, returning how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.is_fresh(now));
        before.saturating_sub(self.slots.len())
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.slots.len();
        let fresh = self.slots.iter().filter(|slot| slot.is_fresh(now)).count();

        CacheStats {
            entries,
            fresh,
            stale: entries.saturating_sub(fresh),
        }
    }

    fn make_room(&self) {
        if self.purge_expired() > 0 {
            return;
        }

        let oldest = self
            .slots
            .iter()
            .min_by_key(|slot| slot.stamp)
            .map(|slot| *slot.key());
        if let Some(pair) = oldest {
            debug!(pair = %pair, "Evicting oldest cached rate");
            self.slots.remove(&pair);
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
}
