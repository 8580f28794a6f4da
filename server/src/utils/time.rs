//! Timestamp helpers
//!
//! Entity timestamps are stored as `YYYY-MM-DD HH:MM:SS` text in UTC so that
//! SQLite `datetime()` comparisons and lexical ordering agree.

use chrono::{NaiveDateTime, Utc};

/// Storage and filter operand format for timestamps (24h clock)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in storage format
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Check that a string is a valid storage-format timestamp
pub fn is_valid_timestamp(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok()
}
