//! Benchmark fixtures for ledgerbar.
//!
//! Run with: `cargo bench --package ledgerbar-bench`

use ledgerbar_lib::{TickRecord, Volume};

/// Returns `count` chronologically ordered records starting at `start`.
///
/// Gaps between ticks vary deterministically from 1 to 120 seconds. Values
/// are wider than 64 bits so exact aggregation works on large integers.
#[must_use]
pub fn synthetic_records(count: u64, start: i64) -> Vec<TickRecord> {
    let mut timestamp = start;
    let mut records = Vec::new();
    for i in 1..=count {
        timestamp += i64::try_from(1 + (i * 7919) % 120).unwrap_or(1);
        let base = 1_000_000_000_000_000_000_000_u128 + u128::from((i * 104_729) % 1_000_000);
        let spread = u128::from(i % 997);
        let volume = if i % 50 == 0 {
            Volume::UNAVAILABLE_MARKER.to_string()
        } else {
            (u128::from(i % 10_000) * 1_000_000_000_000).to_string()
        };
        records.push(TickRecord {
            index: i.to_string(),
            timestamp: timestamp.to_string(),
            open: base.to_string(),
            high: (base + spread).to_string(),
            low: (base - spread).to_string(),
            close: (base + spread / 2).to_string(),
            volume,
            utc_date: String::new(),
            daily_volume: String::new(),
            daily_running_volume: String::new(),
            cumulative_volume: String::new(),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_records_are_ordered() {
        let records = synthetic_records(1_000, 0);
        assert_eq!(records.len(), 1_000);
        assert!(
            records
                .windows(2)
                .all(|w| w[0].timestamp_key() < w[1].timestamp_key())
        );
        assert_eq!(records[49].volume, Volume::UNAVAILABLE_MARKER);
    }
}
