//! JSON output format.

use ledgerbar_aggregate::{Candle, CandleSeries, ohlc_view, volume_view};
use ledgerbar_types::{CandleView, TickRecord};
use serde::Serialize;
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// JSON array (standard JSON).
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL).
    Ndjson,
}

/// JSON formatter.
///
/// Approximate values are written as JSON numbers, exact values as decimal
/// strings.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Output style.
    style: JsonStyle,
    /// Whether to pretty-print (only for array style).
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (array style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether to pretty-print output (array style only).
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }

    fn write_items<W: Write, T: Serialize>(
        &self,
        items: &[T],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, items)?;
                } else {
                    serde_json::to_writer(&mut writer, items)?;
                }
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for item in items {
                    serde_json::to_writer(&mut writer, item)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    fn write_view<W: Write, V: Clone + Serialize>(
        &self,
        candles: &[Candle<V>],
        view: CandleView,
        writer: W,
    ) -> Result<(), FormatError> {
        match view {
            CandleView::Full => self.write_items(candles, writer),
            CandleView::Ohlc => self.write_items(&ohlc_view(candles), writer),
            CandleView::Volume => self.write_items(&volume_view(candles), writer),
        }
    }
}

impl Formatter for JsonFormatter {
    fn write_records<W: Write + Send>(
        &self,
        records: &[TickRecord],
        writer: W,
    ) -> Result<(), FormatError> {
        self.write_items(records, writer)
    }

    fn write_candles<W: Write + Send>(
        &self,
        series: &CandleSeries,
        view: CandleView,
        writer: W,
    ) -> Result<(), FormatError> {
        match series {
            CandleSeries::Approximate(agg) => self.write_view(&agg.candles, view, writer),
            CandleSeries::Exact(agg) => self.write_view(&agg.candles, view, writer),
        }
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}
