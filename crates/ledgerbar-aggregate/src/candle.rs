//! Candle (OHLCV bar) data structure.

use serde::{Deserialize, Serialize};

/// OHLCV candle for one fixed-width time bucket.
///
/// `V` is the value type of the precision mode that produced the candle:
/// `f64` for approximate aggregation, [`Amount`](ledgerbar_types::Amount)
/// for exact aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle<V> {
    /// Bucket start in seconds since epoch (the candle's identity key).
    pub bucket_start: i64,
    /// Open of the first tick folded into the bucket.
    pub open: V,
    /// Highest high across the bucket.
    pub high: V,
    /// Lowest low across the bucket.
    pub low: V,
    /// Close of the last tick folded into the bucket.
    pub close: V,
    /// Sum of volumes; unavailable volumes count as zero.
    pub volume: V,
    /// Number of ticks folded into the bucket.
    pub tick_count: u64,
}
