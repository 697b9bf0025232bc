//! Calendar helpers and timing constants.

use chrono::{Duration, NaiveDate, Utc};

/// Timing constants.
pub mod constants {
    use std::time::Duration;

    /// Live provider request timeout (5 seconds).
    pub fn request_timeout() -> Duration {
        Duration::from_secs(5)
    }

    /// How long a live rate stays cached (60 seconds).
    pub fn cache_ttl() -> Duration {
        Duration::from_secs(60)
    }

    /// Number of days shown by the trend chart.
    pub const TREND_DAYS: u32 = 7;

    /// Longest trend window accepted by configuration (ten years).
    pub const MAX_TREND_DAYS: u32 = 3650;

    /// Default distance of the historical date from today.
    pub const HISTORICAL_DEFAULT_DAYS_BACK: i64 = 7;
}

/// Date format used on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Check if a date lies after today.
pub fn is_future(date: NaiveDate) -> bool {
    date > today()
}

/// The date `days` days before `date`, or `None` if it falls outside the
/// supported calendar.
pub fn days_before(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_sub_signed(delta))
}

/// Default date offered for a historical lookup (one week ago).
pub fn default_historical_date() -> NaiveDate {
    let today = today();
    days_before(today, constants::HISTORICAL_DEFAULT_DAYS_BACK).unwrap_or(today)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
