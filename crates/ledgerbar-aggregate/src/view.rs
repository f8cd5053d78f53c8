//! Projections over an aggregated candle sequence.

use serde::{Deserialize, Serialize};

use crate::Candle;

/// Candle without its volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar<V> {
    /// Bucket start in seconds since epoch.
    pub bucket_start: i64,
    /// Opening value.
    pub open: V,
    /// Highest value.
    pub high: V,
    /// Lowest value.
    pub low: V,
    /// Closing value.
    pub close: V,
}

/// Candle volume alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBar<V> {
    /// Bucket start in seconds since epoch.
    pub bucket_start: i64,
    /// Summed volume.
    pub volume: V,
}

/// Drops the volume from every candle, preserving order.
pub fn ohlc_view<V: Clone>(candles: &[Candle<V>]) -> Vec<OhlcBar<V>> {
    candles
        .iter()
        .map(|c| OhlcBar {
            bucket_start: c.bucket_start,
            open: c.open.clone(),
            high: c.high.clone(),
            low: c.low.clone(),
            close: c.close.clone(),
        })
        .collect()
}

/// Keeps only the volume of every candle, preserving order.
pub fn volume_view<V: Clone>(candles: &[Candle<V>]) -> Vec<VolumeBar<V>> {
    candles
        .iter()
        .map(|c| VolumeBar {
            bucket_start: c.bucket_start,
            volume: c.volume.clone(),
        })
        .collect()
}
