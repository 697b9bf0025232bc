//! Currex Common Types
//!
//! Shared types used across the currex crates: the supported currency set,
//! currency pairs, rates with provenance, and calendar helpers.

pub mod currency;
pub mod rate;
pub mod error;
pub mod time;

pub use currency::*;
pub use rate::*;
pub use error::*;
pub use time::*;
