//! Tick collection for ledgerbar.
//!
//! This crate produces the ordered tick set the aggregation engine consumes:
//!
//! - [`TickSource`] - Seam to whatever supplies raw ticks
//! - [`IndicatorClient`] - HTTP source with retries and request pacing
//! - [`SourceConfig`] - Connection parameters, from code or the environment
//! - [`collect`] - Sequential collection pass with running volume totals
//! - [`DailyVolumeIndex`] - Finalized volume per UTC date

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod collector;
mod source;

pub use client::{
    ClientError, ConfigError, ENV_MAX_RETRIES, ENV_REQUEST_INTERVAL_MS, ENV_SOURCE_URL,
    IndicatorClient, SourceConfig, SourceOverrides,
};
pub use collector::{
    CollectError, CollectedTick, Collection, DailyVolumeIndex, FetchStage, RunningTotals,
    RunningVolume, collect,
};
pub use source::{SourceError, TickSource};
