//! Tick collection and dual-precision candle aggregation.
//!
//! This is a facade crate that re-exports functionality from the ledgerbar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use ledgerbar_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = IndicatorClient::new(SourceConfig::from_env()?)?;
//!     let store = TickStore::new("ticks.csv");
//!     pipeline::collect_to_store(&client, &store, |_, _| {}).await?;
//!
//!     let request = CandleRequest::resolve("1 hour", Some("exact"), None)?;
//!     let series = pipeline::load_candles(&store, &request).await?;
//!     println!("{} candles", series.len());
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use ledgerbar_types::*;

// Re-export collection
#[cfg(feature = "collect")]
pub use ledgerbar_collect::{
    ClientError, CollectError, CollectedTick, Collection, ConfigError, DailyVolumeIndex,
    FetchStage, IndicatorClient, RunningTotals, RunningVolume, SourceConfig, SourceError,
    SourceOverrides, TickSource, collect,
};

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use ledgerbar_aggregate::{
    AggregateError, Aggregation, Approximate, Candle, CandleAggregator, CandleRequest,
    CandleSeries, Exact, MalformedRecord, OhlcBar, Precision, RequestError, VolumeBar, aggregate,
    aggregate_records, ohlc_view, volume_view,
};

// Re-export storage and formatters
#[cfg(feature = "format")]
pub use ledgerbar_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, TickStore,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use ledgerbar_format::ParquetFormatter;

#[cfg(all(feature = "collect", feature = "format"))]
pub mod pipeline;

/// Prelude module for convenient imports.
///
/// ```
/// use ledgerbar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use ledgerbar_types::{
        Amount, CandleView, LedgerbarError, PrecisionMode, Result, Tick, TickRecord, Timeframe,
        Volume,
    };

    #[cfg(feature = "collect")]
    pub use ledgerbar_collect::{
        IndicatorClient, SourceConfig, SourceOverrides, TickSource, collect,
    };

    #[cfg(feature = "aggregate")]
    pub use ledgerbar_aggregate::{Candle, CandleRequest, CandleSeries, aggregate_records};

    #[cfg(feature = "format")]
    pub use ledgerbar_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat, TickStore};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use ledgerbar_format::ParquetFormatter;

    #[cfg(all(feature = "collect", feature = "format"))]
    pub use crate::pipeline;
}
