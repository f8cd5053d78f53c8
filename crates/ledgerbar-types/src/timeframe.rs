//! Candle timeframe vocabulary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Candle bucket width, addressed by a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    /// 1-minute candles.
    #[serde(rename = "1 minute")]
    Minute1,
    /// 5-minute candles.
    #[serde(rename = "5 minutes")]
    Minute5,
    /// 15-minute candles.
    #[serde(rename = "15 minutes")]
    Minute15,
    /// 30-minute candles.
    #[serde(rename = "30 minutes")]
    Minute30,
    /// 1-hour candles.
    #[default]
    #[serde(rename = "1 hour")]
    Hour1,
    /// 4-hour candles.
    #[serde(rename = "4 hours")]
    Hour4,
    /// 12-hour candles.
    #[serde(rename = "12 hours")]
    Hour12,
    /// Daily candles.
    #[serde(rename = "1 day")]
    Day1,
}

impl Timeframe {
    /// Returns the bucket width in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour4 => 14_400,
            Self::Hour12 => 43_200,
            Self::Day1 => 86_400,
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Minute1 => "1 minute",
            Self::Minute5 => "5 minutes",
            Self::Minute15 => "15 minutes",
            Self::Minute30 => "30 minutes",
            Self::Hour1 => "1 hour",
            Self::Hour4 => "4 hours",
            Self::Hour12 => "12 hours",
            Self::Day1 => "1 day",
        }
    }

    /// Returns all available timeframes, shortest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour4,
            Self::Hour12,
            Self::Day1,
        ]
    }

    /// Returns the canonical labels of all timeframes.
    pub fn labels() -> impl Iterator<Item = &'static str> {
        Self::all().iter().map(Self::label)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_lowercase().as_str() {
            "1 minute" | "m1" | "1m" => Ok(Self::Minute1),
            "5 minutes" | "m5" | "5m" => Ok(Self::Minute5),
            "15 minutes" | "m15" | "15m" => Ok(Self::Minute15),
            "30 minutes" | "m30" | "30m" => Ok(Self::Minute30),
            "1 hour" | "h1" | "1h" => Ok(Self::Hour1),
            "4 hours" | "h4" | "4h" => Ok(Self::Hour4),
            "12 hours" | "h12" | "12h" => Ok(Self::Hour12),
            "1 day" | "d1" | "1d" => Ok(Self::Day1),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown timeframe label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown timeframe '{0}', expected one of: {labels}", labels = Timeframe::labels().collect::<Vec<_>>().join(", "))]
pub struct TimeframeParseError(String);

impl TimeframeParseError {
    /// Returns the label that failed to parse.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }

    /// Returns every label the parser accepts in canonical form.
    #[must_use]
    pub fn valid_labels(&self) -> Vec<&'static str> {
        Timeframe::labels().collect()
    }
}
