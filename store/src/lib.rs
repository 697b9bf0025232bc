//! Currex Store
//!
//! Persistence for user state. The [`KeyValueStore`] trait is the durable
//! store collaborator (string keys, string values, single-key reads and
//! writes); [`PreferenceStore`] keeps favorites and preferred settings on
//! top of it and flushes every change immediately.

pub mod error;
pub mod kv;
pub mod preferences;

pub use error::{StoreError, StoreResult};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use preferences::{keys, Language, PreferenceStore, Theme};
