//! Candle field projections requested by callers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Which fields of a candle a caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleView {
    /// Every candle field.
    #[default]
    Full,
    /// Open, high, low and close only.
    Ohlc,
    /// Volume only.
    Volume,
}

impl CandleView {
    /// Returns the view name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Ohlc => "ohlc",
            Self::Volume => "volume",
        }
    }
}

impl std::fmt::Display for CandleView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CandleView {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "ohlcv" => Ok(Self::Full),
            "ohlc" => Ok(Self::Ohlc),
            "volume" => Ok(Self::Volume),
            _ => Err(ViewParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown view name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown view '{0}', expected one of: full, ohlc, volume")]
pub struct ViewParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view() {
        assert_eq!("OHLC".parse::<CandleView>().unwrap(), CandleView::Ohlc);
        assert_eq!("volume".parse::<CandleView>().unwrap(), CandleView::Volume);
        assert_eq!("full".parse::<CandleView>().unwrap(), CandleView::Full);
        assert!("candles".parse::<CandleView>().is_err());
    }

    #[test]
    fn test_default_is_full() {
        assert_eq!(CandleView::default(), CandleView::Full);
    }
}
