//! Numeric strategies for the two precision modes.

use ledgerbar_types::{Amount, PrecisionMode, TimestampKey};
use serde::Serialize;
use std::fmt::{Debug, Display};

/// Numeric strategy injected into the candle fold.
///
/// The fold is written once against this trait. Each implementation owns
/// parsing, the zero value and summation for its mode, so values of the two
/// modes can never meet inside one aggregation.
pub trait Precision {
    /// Value type every numeric field is parsed into.
    type Value: Clone + Debug + Display + PartialOrd + Serialize;

    /// The mode this strategy implements.
    const MODE: PrecisionMode;

    /// Parses a price or volume field.
    fn parse(text: &str) -> Option<Self::Value>;

    /// Parses a timestamp field.
    fn parse_timestamp(text: &str) -> Option<TimestampKey>;

    /// Returns the additive identity.
    fn zero() -> Self::Value;

    /// Adds `value` into `total`.
    fn accumulate(total: &mut Self::Value, value: &Self::Value);
}

/// Floating-point strategy.
///
/// Every field must parse as a finite `f64`. Fractional timestamps keep their
/// order within a second and are floored when bucketed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Approximate;

impl Precision for Approximate {
    type Value = f64;

    const MODE: PrecisionMode = PrecisionMode::Approximate;

    fn parse(text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn parse_timestamp(text: &str) -> Option<TimestampKey> {
        TimestampKey::parse(text)
    }

    fn zero() -> f64 {
        0.0
    }

    fn accumulate(total: &mut f64, value: &f64) {
        *total += *value;
    }
}

/// Unbounded-precision integer strategy.
///
/// Values must be plain decimal digits and timestamps plain integers. Nothing
/// is ever routed through a float.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl Precision for Exact {
    type Value = Amount;

    const MODE: PrecisionMode = PrecisionMode::Exact;

    fn parse(text: &str) -> Option<Amount> {
        text.parse().ok()
    }

    fn parse_timestamp(text: &str) -> Option<TimestampKey> {
        text.trim().parse().ok().map(TimestampKey::whole)
    }

    fn zero() -> Amount {
        Amount::zero()
    }

    fn accumulate(total: &mut Amount, value: &Amount) {
        *total += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_parse() {
        assert_eq!(Approximate::parse("1.5"), Some(1.5));
        assert_eq!(Approximate::parse(" 42 "), Some(42.0));
        assert_eq!(Approximate::parse("NaN"), None);
        assert_eq!(Approximate::parse("inf"), None);
        assert_eq!(Approximate::parse("ten"), None);
    }

    #[test]
    fn test_approximate_timestamp_keeps_fraction() {
        let early = Approximate::parse_timestamp("90.2").unwrap();
        let late = Approximate::parse_timestamp("90.7").unwrap();
        assert_eq!(late.seconds(), 90);
        assert!(early < late);
        assert_eq!(Approximate::parse_timestamp("1e400"), None);
        assert_eq!(Approximate::parse_timestamp("NaN"), None);
    }

    #[test]
    fn test_exact_parse() {
        assert_eq!(Exact::parse("100"), Some(Amount::from(100)));
        assert_eq!(Exact::parse("1.5"), None);
        assert_eq!(Exact::parse("-3"), None);
        assert_eq!(Exact::parse_timestamp("90"), Some(TimestampKey::whole(90)));
        assert_eq!(Exact::parse_timestamp("90.5"), None);
    }

    #[test]
    fn test_exact_accumulate_has_no_rounding() {
        let mut total = Exact::zero();
        let big: Amount = "9007199254740993".parse().unwrap();
        Exact::accumulate(&mut total, &big);
        Exact::accumulate(&mut total, &Amount::from(1));
        assert_eq!(total.to_string(), "9007199254740994");
    }
}
