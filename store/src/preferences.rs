//! Favorites and preferred settings.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use currex_common::{Currency, CurrencyPair};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Keys used in the durable store.
pub mod keys {
    pub const FAVORITES: &str = "favorites";
    pub const PREFERRED_FROM: &str = "preferredFrom";
    pub const PREFERRED_TO: &str = "preferredTo";
    pub const LANGUAGE: &str = "language";
    pub const THEME: &str = "theme";
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Sinhala,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Sinhala => "si",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::English),
            "si" => Ok(Language::Sinhala),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme.
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Default)]
struct Preferences {
    favorites: Vec<CurrencyPair>,
    preferred: Option<CurrencyPair>,
    language: Language,
    theme: Theme,
}

/// User preferences backed by a [`KeyValueStore`].
///
/// Everything is read once in [`PreferenceStore::load`]; after that the
/// in-memory copy is the source of truth and every change is written
/// through immediately.
pub struct PreferenceStore {
    kv: Arc<dyn KeyValueStore>,
    state: Mutex<Preferences>,
}

impl PreferenceStore {
    /// Load preferences from the durable store.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> StoreResult<Self> {
        let favorites = Self::read_favorites(kv.as_ref())?;

        let preferred_from = Self::read_parsed::<Currency>(kv.as_ref(), keys::PREFERRED_FROM)?;
        let preferred_to = Self::read_parsed::<Currency>(kv.as_ref(), keys::PREFERRED_TO)?;
        let preferred = match (preferred_from, preferred_to) {
            (Some(from), Some(to)) => Some(CurrencyPair::new(from, to)),
            _ => None,
        };

        let language: Language = Self::read_parsed(kv.as_ref(), keys::LANGUAGE)?.unwrap_or_default();
        let theme: Theme = Self::read_parsed(kv.as_ref(), keys::THEME)?.unwrap_or_default();

        info!(
            favorites = favorites.len(),
            preferred = ?preferred.map(|p| p.to_string()),
            language = %language,
            theme = %theme,
            "Loaded preferences"
        );

        Ok(Self {
            kv,
            state: Mutex::new(Preferences {
                favorites,
                preferred,
                language,
                theme,
            }),
        })
    }

    /// Add a favorite pair.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the pair is already saved.
    pub fn save_favorite(&self, pair: CurrencyPair) -> StoreResult<()> {
        let mut state = self.state.lock();
        if state.favorites.contains(&pair) {
            return Err(StoreError::AlreadyExists(pair));
        }

        state.favorites.push(pair);
        if let Err(e) = self.write_favorites(&state.favorites) {
            state.favorites.pop();
            return Err(e);
        }

        debug!(pair = %pair, "Saved favorite");
        Ok(())
    }

    /// Remove a favorite pair. Returns whether it was present.
    pub fn remove_favorite(&self, pair: CurrencyPair) -> StoreResult<bool> {
        let mut state = self.state.lock();
        let Some(index) = state.favorites.iter().position(|p| *p == pair) else {
            return Ok(false);
        };

        state.favorites.remove(index);
        if let Err(e) = self.write_favorites(&state.favorites) {
            state.favorites.insert(index, pair);
            return Err(e);
        }

        debug!(pair = %pair, "Removed favorite");
        Ok(true)
    }

    /// Favorites in insertion order.
    pub fn list_favorites(&self) -> Vec<CurrencyPair> {
        self.state.lock().favorites.clone()
    }

    /// Remember the currencies of the last user-initiated conversion.
    ///
    /// Both keys are written or neither is: if the second write fails, the
    /// stored `preferredFrom` is put back.
    pub fn save_preferred_currencies(&self, from: Currency, to: Currency) -> StoreResult<()> {
        let mut state = self.state.lock();
        let previous_from = self.kv.get(keys::PREFERRED_FROM)?;

        self.kv.set(keys::PREFERRED_FROM, from.code())?;
        if let Err(e) = self.kv.set(keys::PREFERRED_TO, to.code()) {
            let restored = match &previous_from {
                Some(code) => self.kv.set(keys::PREFERRED_FROM, code),
                None => self.kv.remove(keys::PREFERRED_FROM),
            };
            if let Err(restore_error) = restored {
                warn!(error = %restore_error, "Failed to restore preferred source currency");
            }
            return Err(e);
        }

        state.preferred = Some(CurrencyPair::new(from, to));
        Ok(())
    }

    /// Currencies of the last user-initiated conversion, if any.
    pub fn load_preferred_currencies(&self) -> Option<CurrencyPair> {
        self.state.lock().preferred
    }

    pub fn language(&self) -> Language {
        self.state.lock().language
    }

    pub fn set_language(&self, language: Language) -> StoreResult<()> {
        let mut state = self.state.lock();
        self.kv.set(keys::LANGUAGE, language.code())?;
        state.language = language;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().theme
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        let mut state = self.state.lock();
        self.kv.set(keys::THEME, theme.code())?;
        state.theme = theme;
        Ok(())
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle_theme(&self) -> StoreResult<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn write_favorites(&self, favorites: &[CurrencyPair]) -> StoreResult<()> {
        let encoded = serde_json::to_string(favorites)?;
        self.kv.set(keys::FAVORITES, &encoded)
    }

    fn read_favorites(kv: &dyn KeyValueStore) -> StoreResult<Vec<CurrencyPair>> {
        let Some(raw) = kv.get(keys::FAVORITES)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<String> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable favorites");
                return Ok(Vec::new());
            }
        };

        let mut favorites: Vec<CurrencyPair> = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.parse::<CurrencyPair>() {
                Ok(pair) if !favorites.contains(&pair) => favorites.push(pair),
                Ok(_) => {}
                Err(e) => warn!(entry = %entry, error = %e, "Skipping invalid favorite"),
            }
        }
        Ok(favorites)
    }

    fn read_parsed<T: FromStr>(kv: &dyn KeyValueStore, key: &str) -> StoreResult<Option<T>>
    where
        T::Err: fmt::Display,
    {
        let Some(raw) = kv.get(key)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key, value = %raw, error = %e, "Ignoring invalid stored preference");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    /// Memory store whose writes to one key fail.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if key == self.failing_key {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    fn usd_eur() -> CurrencyPair {
        CurrencyPair::new(Currency::Usd, Currency::Eur)
    }

    fn fresh() -> (Arc<MemoryStore>, PreferenceStore) {
        let kv = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::load(kv.clone()).unwrap();
        (kv, prefs)
    }

    #[test]
    fn test_first_run_defaults() {
        let (_, prefs) = fresh();
        assert!(prefs.list_favorites().is_empty());
        assert!(prefs.load_preferred_currencies().is_none());
        assert_eq!(prefs.language(), Language::English);
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_save_favorite_twice() {
        let (kv, prefs) = fresh();

        prefs.save_favorite(usd_eur()).unwrap();
        let second = prefs.save_favorite(usd_eur());

        assert!(matches!(second, Err(StoreError::AlreadyExists(p)) if p == usd_eur()));
        assert_eq!(prefs.list_favorites(), vec![usd_eur()]);
        assert_eq!(
            kv.get(keys::FAVORITES).unwrap().as_deref(),
            Some(r#"["USD-EUR"]"#)
        );
    }

    #[test]
    fn test_favorites_keep_insertion_order() {
        let (_, prefs) = fresh();
        let pairs = [
            CurrencyPair::new(Currency::Lkr, Currency::Usd),
            usd_eur(),
            CurrencyPair::new(Currency::Gbp, Currency::Jpy),
        ];
        for pair in pairs {
            prefs.save_favorite(pair).unwrap();
        }

        assert_eq!(prefs.list_favorites(), pairs.to_vec());
        // Reversed direction is a different pair
        prefs.save_favorite(usd_eur().inverse()).unwrap();
        assert_eq!(prefs.list_favorites().len(), 4);
    }

    #[test]
    fn test_remove_favorite_is_idempotent() {
        let (_, prefs) = fresh();
        prefs.save_favorite(usd_eur()).unwrap();

        assert!(prefs.remove_favorite(usd_eur()).unwrap());
        assert!(!prefs.remove_favorite(usd_eur()).unwrap());
        assert!(prefs.list_favorites().is_empty());
    }

    #[test]
    fn test_preferences_survive_reload() {
        let (kv, prefs) = fresh();
        prefs.save_favorite(usd_eur()).unwrap();
        prefs.save_preferred_currencies(Currency::Gbp, Currency::Lkr).unwrap();
        prefs.set_language(Language::Sinhala).unwrap();
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);

        let reloaded = PreferenceStore::load(kv).unwrap();
        assert_eq!(reloaded.list_favorites(), vec![usd_eur()]);
        assert_eq!(
            reloaded.load_preferred_currencies(),
            Some(CurrencyPair::new(Currency::Gbp, Currency::Lkr))
        );
        assert_eq!(reloaded.language(), Language::Sinhala);
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_failed_preferred_write_keeps_old_pair() {
        let inner = MemoryStore::new();
        inner.set(keys::PREFERRED_FROM, "GBP").unwrap();
        inner.set(keys::PREFERRED_TO, "LKR").unwrap();
        let kv = Arc::new(FailingStore {
            inner,
            failing_key: keys::PREFERRED_TO,
        });
        let prefs = PreferenceStore::load(kv.clone()).unwrap();

        let result = prefs.save_preferred_currencies(Currency::Usd, Currency::Jpy);

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(kv.get(keys::PREFERRED_FROM).unwrap().as_deref(), Some("GBP"));
        assert_eq!(kv.get(keys::PREFERRED_TO).unwrap().as_deref(), Some("LKR"));
        assert_eq!(
            prefs.load_preferred_currencies(),
            Some(CurrencyPair::new(Currency::Gbp, Currency::Lkr))
        );
    }

    #[test]
    fn test_failed_preferred_write_without_previous_pair() {
        let kv = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: keys::PREFERRED_TO,
        });
        let prefs = PreferenceStore::load(kv.clone()).unwrap();

        assert!(prefs
            .save_preferred_currencies(Currency::Cad, Currency::Chf)
            .is_err());

        assert!(kv.get(keys::PREFERRED_FROM).unwrap().is_none());
        assert!(prefs.load_preferred_currencies().is_none());
    }

    #[test]
    fn test_invalid_stored_values_are_skipped() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::FAVORITES, r#"["USD-EUR","BAD","USD-EUR","CAD-AUD"]"#)
            .unwrap();
        kv.set(keys::PREFERRED_FROM, "XYZ").unwrap();
        kv.set(keys::PREFERRED_TO, "EUR").unwrap();
        kv.set(keys::THEME, "purple").unwrap();

        let prefs = PreferenceStore::load(kv).unwrap();
        assert_eq!(
            prefs.list_favorites(),
            vec![usd_eur(), CurrencyPair::new(Currency::Cad, Currency::Aud)]
        );
        assert!(prefs.load_preferred_currencies().is_none());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn test_unreadable_favorites_start_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::FAVORITES, "{oops").unwrap();

        let prefs = PreferenceStore::load(kv).unwrap();
        assert!(prefs.list_favorites().is_empty());
    }
}
