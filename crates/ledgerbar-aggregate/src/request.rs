//! Resolution of candle requests expressed as labels.

use ledgerbar_types::{
    CandleView, LedgerbarError, PrecisionMode, PrecisionParseError, TickRecord, Timeframe,
    TimeframeParseError, ViewParseError,
};
use thiserror::Error;

use crate::{AggregateError, CandleSeries, aggregate_records};

/// A request argument that is not part of the supported vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Unsupported timeframe label.
    #[error(transparent)]
    UnknownTimeframe(#[from] TimeframeParseError),

    /// Unsupported precision mode.
    #[error(transparent)]
    UnknownPrecision(#[from] PrecisionParseError),

    /// Unsupported candle view.
    #[error(transparent)]
    UnknownView(#[from] ViewParseError),
}

impl From<RequestError> for LedgerbarError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::UnknownTimeframe(e) => Self::UnknownTimeframe(e),
            RequestError::UnknownPrecision(e) => Self::UnknownPrecision(e),
            RequestError::UnknownView(e) => Self::UnknownView(e),
        }
    }
}

/// A validated candle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandleRequest {
    /// Bucket width.
    pub timeframe: Timeframe,
    /// Numeric handling.
    pub mode: PrecisionMode,
    /// Projection applied when the candles are emitted.
    pub view: CandleView,
}

impl CandleRequest {
    /// Creates a request from already-typed arguments.
    #[must_use]
    pub const fn new(timeframe: Timeframe, mode: PrecisionMode, view: CandleView) -> Self {
        Self {
            timeframe,
            mode,
            view,
        }
    }

    /// Resolves a request from user-facing labels.
    ///
    /// Absent mode and view fall back to approximate and full.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first label that is not recognized. An
    /// unknown timeframe carries the list of valid labels.
    pub fn resolve(
        timeframe: &str,
        mode: Option<&str>,
        view: Option<&str>,
    ) -> Result<Self, RequestError> {
        let timeframe = timeframe.parse::<Timeframe>()?;
        let mode = mode
            .map(str::parse::<PrecisionMode>)
            .transpose()?
            .unwrap_or_default();
        let view = view
            .map(str::parse::<CandleView>)
            .transpose()?
            .unwrap_or_default();
        Ok(Self::new(timeframe, mode, view))
    }

    /// Aggregates `records` with this request's timeframe and mode.
    ///
    /// The view is not applied here; formatters project the series on output.
    ///
    /// # Errors
    ///
    /// Propagates aggregation errors.
    pub fn execute(&self, records: &[TickRecord]) -> Result<CandleSeries, AggregateError> {
        aggregate_records(records, self.timeframe.seconds(), self.mode)
    }
}
