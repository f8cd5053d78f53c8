//! The seam between the collector and whatever supplies raw ticks.

use async_trait::async_trait;
use ledgerbar_types::{Amount, Ohlc};
use thiserror::Error;

use crate::ClientError;

/// Error returned by a [`TickSource`] lookup.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The HTTP client failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The source answered but had no usable value.
    #[error("{0}")]
    Rejected(String),
}

/// Supplier of raw ticks, queried one tick at a time.
///
/// Indices are 1-based. OHLC and volume are looked up by the timestamp the
/// source returned for an index.
#[async_trait]
pub trait TickSource: Send + Sync {
    /// Returns the total number of ticks.
    async fn tick_count(&self) -> Result<u64, SourceError>;

    /// Returns the timestamp of tick `index`.
    async fn timestamp(&self, index: u64) -> Result<i64, SourceError>;

    /// Returns the OHLC quadruple at `timestamp`.
    async fn ohlc(&self, timestamp: i64) -> Result<Ohlc, SourceError>;

    /// Returns the volume at `timestamp`.
    async fn volume(&self, timestamp: i64) -> Result<Amount, SourceError>;
}
