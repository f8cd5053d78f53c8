//! Numeric precision mode selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Numeric regime used by one aggregation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionMode {
    /// Floating-point values; rounding error is accepted.
    #[default]
    Approximate,
    /// Unbounded-precision integers rendered as decimal text.
    Exact,
}

impl PrecisionMode {
    /// Returns the mode as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approximate => "approximate",
            Self::Exact => "exact",
        }
    }
}

impl std::fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrecisionMode {
    type Err = PrecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approximate" => Ok(Self::Approximate),
            "exact" => Ok(Self::Exact),
            _ => Err(PrecisionParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown precision mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown precision mode '{0}', expected one of: approximate, exact")]
pub struct PrecisionParseError(String);
