//! Error types for ledgerbar.

use thiserror::Error;

use crate::{PrecisionParseError, TimeframeParseError, ViewParseError};

/// Result type alias for ledgerbar operations.
pub type Result<T> = std::result::Result<T, LedgerbarError>;

/// Errors surfaced by the collection and aggregation pipeline.
///
/// Unavailable volumes and malformed records are not errors: the former is
/// recorded as data, the latter is reported alongside a partial result.
#[derive(Error, Debug)]
pub enum LedgerbarError {
    /// Missing or invalid connection parameters for the tick source.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A structurally required fetch failed and the pass was aborted.
    #[error("Source fetch error: {0}")]
    SourceFetch(String),

    /// The source answered, but its ticks cannot form a valid pass.
    #[error("Collection error: {0}")]
    Collect(String),

    /// The requested timeframe label is not part of the vocabulary.
    #[error(transparent)]
    UnknownTimeframe(#[from] TimeframeParseError),

    /// The requested precision mode is not recognized.
    #[error(transparent)]
    UnknownPrecision(#[from] PrecisionParseError),

    /// The requested candle view is not recognized.
    #[error(transparent)]
    UnknownView(#[from] ViewParseError),

    /// Aggregation rejected its input.
    #[error("Aggregation error: {0}")]
    Aggregate(String),

    /// Reading or writing the persisted tick store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
