//! Candle aggregation for the ledgerbar tick pipeline.
//!
//! This crate folds persisted tick records into fixed-width candles:
//!
//! - [`Candle`] - OHLCV bar keyed by bucket start
//! - [`Precision`] - Numeric strategy with [`Approximate`] and [`Exact`] implementations
//! - [`CandleAggregator`] - Incremental map-based aggregator
//! - [`CandleRequest`] - Timeframe, mode and view resolved from labels

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod candle;
mod precision;
mod request;
mod view;

pub use aggregator::{
    AggregateError, Aggregation, CandleAggregator, CandleSeries, MalformedRecord, aggregate,
    aggregate_records,
};
pub use candle::Candle;
pub use precision::{Approximate, Exact, Precision};
pub use request::{CandleRequest, RequestError};
pub use view::{OhlcBar, VolumeBar, ohlc_view, volume_view};
