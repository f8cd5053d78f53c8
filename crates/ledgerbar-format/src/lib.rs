//! Persistence and output formatters for ledgerbar.
//!
//! This crate stores collected tick records and writes records and candles
//! to various output formats:
//!
//! - [`TickStore`] - Atomic CSV store of tick records
//! - [`CsvFormatter`] - CSV format
//! - [`JsonFormatter`] - JSON array or NDJSON format
//! - [`ParquetFormatter`] - Apache Parquet columnar format

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;
mod store;

#[cfg(feature = "parquet")]
mod parquet;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};
pub use store::TickStore;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetFormatter;
