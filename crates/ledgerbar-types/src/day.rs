//! UTC calendar day helpers.

use chrono::{DateTime, NaiveDate};

/// Returns the UTC calendar date containing `timestamp` (seconds since epoch).
///
/// The date depends on the timestamp alone. Returns `None` if the timestamp is
/// outside the range chrono can represent.
#[must_use]
pub fn utc_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}
