//! Persisted tick records.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One persisted row per collected tick.
///
/// Every column is kept as text. Records come back from an external file
/// that may have been edited by hand, so each numeric column is validated
/// only when a precision mode parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    /// 1-based sequence position.
    pub index: String,
    /// Seconds since the Unix epoch.
    pub timestamp: String,
    /// Opening value.
    pub open: String,
    /// Highest value.
    pub high: String,
    /// Lowest value.
    pub low: String,
    /// Closing value.
    pub close: String,
    /// Volume, or [`Volume::UNAVAILABLE_MARKER`](crate::Volume::UNAVAILABLE_MARKER).
    pub volume: String,
    /// UTC calendar date (`YYYY-MM-DD`).
    pub utc_date: String,
    /// Finalized volume of the whole UTC date.
    pub daily_volume: String,
    /// Running volume of the UTC date up to and including this tick.
    pub daily_running_volume: String,
    /// Running volume since the start of the collection pass.
    pub cumulative_volume: String,
}

impl TickRecord {
    /// Column names in persisted order.
    pub const COLUMNS: [&'static str; 11] = [
        "index",
        "timestamp",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "utc_date",
        "daily_volume",
        "daily_running_volume",
        "cumulative_volume",
    ];

    /// Returns the field values in [`Self::COLUMNS`] order.
    #[must_use]
    pub fn fields(&self) -> [&str; 11] {
        [
            self.index.as_str(),
            self.timestamp.as_str(),
            self.open.as_str(),
            self.high.as_str(),
            self.low.as_str(),
            self.close.as_str(),
            self.volume.as_str(),
            self.utc_date.as_str(),
            self.daily_volume.as_str(),
            self.daily_running_volume.as_str(),
            self.cumulative_volume.as_str(),
        ]
    }

    /// Returns true if the volume column holds the unavailable marker.
    #[must_use]
    pub fn volume_unavailable(&self) -> bool {
        self.volume.trim() == crate::Volume::UNAVAILABLE_MARKER
    }

    /// Returns the key used to order records chronologically.
    ///
    /// Yields `None` (sorting first) when the timestamp is not a number.
    #[must_use]
    pub fn timestamp_key(&self) -> Option<TimestampKey> {
        TimestampKey::parse(&self.timestamp)
    }
}

/// A timestamp split into whole seconds and the fraction of a second.
///
/// Integer text keeps every digit of its `i64`; fractional text orders by
/// its full `f64` value, so two ticks inside the same second still compare.
#[derive(Debug, Clone, Copy)]
pub struct TimestampKey {
    seconds: i64,
    fraction: f64,
}

impl TimestampKey {
    /// A key for a whole number of seconds.
    #[must_use]
    pub const fn whole(seconds: i64) -> Self {
        Self {
            seconds,
            fraction: 0.0,
        }
    }

    /// Parses integer or finite decimal text.
    ///
    /// Returns `None` for non-numbers and for values whose floor does not
    /// fit in `i64`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(seconds) = text.parse::<i64>() {
            return Some(Self::whole(seconds));
        }
        let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
        let seconds = floor_to_i64(value)?;
        Some(Self {
            seconds,
            fraction: value - value.floor(),
        })
    }

    /// Whole seconds, floored.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }
}

impl Ord for TimestampKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.seconds
            .cmp(&other.seconds)
            .then_with(|| self.fraction.total_cmp(&other.fraction))
    }
}

impl PartialOrd for TimestampKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimestampKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimestampKey {}

impl fmt::Display for TimestampKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fraction == 0.0 {
            write!(f, "{}", self.seconds)
        } else {
            // A nonzero fraction only survives below 2^53, where the sum is exact.
            write!(f, "{}", self.seconds as f64 + self.fraction)
        }
    }
}

/// Floors a finite float to `i64`, or `None` when it does not fit.
#[must_use]
pub fn floor_to_i64(value: f64) -> Option<i64> {
    let floored = value.floor();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if floored >= i64::MIN as f64 && floored < i64::MAX as f64 {
        Some(floored as i64)
    } else {
        None
    }
}
