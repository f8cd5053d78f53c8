//! Core types for the ledgerbar tick-to-candle pipeline.
//!
//! This crate provides the fundamental data structures used throughout ledgerbar:
//!
//! - [`Amount`] - Unbounded-precision non-negative integer
//! - [`Tick`] - One on-chain observation with OHLC and volume
//! - [`TickRecord`] - Text-typed persisted row for a collected tick
//! - [`Timeframe`] - Candle bucket width vocabulary
//! - [`PrecisionMode`] - Approximate or exact numeric handling
//! - [`CandleView`] - Full, OHLC-only or volume-only candle projection

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod amount;
mod day;
mod error;
mod precision;
mod record;
mod tick;
mod timeframe;
mod view;

pub use amount::{Amount, AmountParseError};
pub use day::utc_date;
pub use error::{LedgerbarError, Result};
pub use precision::{PrecisionMode, PrecisionParseError};
pub use record::{TickRecord, TimestampKey, floor_to_i64};
pub use tick::{Ohlc, Tick, Volume};
pub use timeframe::{Timeframe, TimeframeParseError};
pub use view::{CandleView, ViewParseError};
