//! Tick data representation.

use std::fmt;

use crate::Amount;

/// Open, high, low and close values of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ohlc {
    /// Opening value.
    pub open: Amount,
    /// Highest value.
    pub high: Amount,
    /// Lowest value.
    pub low: Amount,
    /// Closing value.
    pub close: Amount,
}

impl Ohlc {
    /// Creates a new OHLC quadruple.
    #[must_use]
    pub const fn new(open: Amount, high: Amount, low: Amount, close: Amount) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

/// Volume of a tick, or an explicit marker when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Volume {
    /// The source returned a volume.
    Available(Amount),
    /// The volume lookup failed for this tick's timestamp.
    Unavailable,
}

impl Volume {
    /// Text stored in place of a volume that could not be fetched.
    pub const UNAVAILABLE_MARKER: &'static str = "unavailable";

    /// Returns the amount if the volume is available.
    #[must_use]
    pub const fn amount(&self) -> Option<&Amount> {
        match self {
            Self::Available(amount) => Some(amount),
            Self::Unavailable => None,
        }
    }

    /// Returns true if the volume is available.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl From<Amount> for Volume {
    fn from(amount: Amount) -> Self {
        Self::Available(amount)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(amount) => write!(f, "{amount}"),
            Self::Unavailable => f.write_str(Self::UNAVAILABLE_MARKER),
        }
    }
}

/// One observation per source transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// 1-based sequence position.
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Price quadruple.
    pub ohlc: Ohlc,
    /// Traded volume.
    pub volume: Volume,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(index: u64, timestamp: i64, ohlc: Ohlc, volume: Volume) -> Self {
        Self {
            index,
            timestamp,
            ohlc,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_display() {
        assert_eq!(Volume::from(Amount::from(5)).to_string(), "5");
        assert_eq!(Volume::Unavailable.to_string(), "unavailable");
    }

    #[test]
    fn test_volume_amount() {
        assert_eq!(
            Volume::Available(Amount::from(9)).amount(),
            Some(&Amount::from(9))
        );
        assert!(Volume::Unavailable.amount().is_none());
        assert!(!Volume::Unavailable.is_available());
    }
}
