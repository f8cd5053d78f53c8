//! CSV output format.

use ledgerbar_aggregate::{Candle, CandleSeries};
use ledgerbar_types::{CandleView, TickRecord};
use std::fmt::Display;
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }

    fn write_row<W: Write, T: Display>(
        &self,
        writer: &mut W,
        fields: impl IntoIterator<Item = T>,
    ) -> Result<(), FormatError> {
        let mut first = true;
        for field in fields {
            if !first {
                write!(writer, "{}", self.delimiter)?;
            }
            write!(writer, "{field}")?;
            first = false;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_rows<W: Write, V: Display>(
        &self,
        candles: &[Candle<V>],
        view: CandleView,
        mut writer: W,
    ) -> Result<(), FormatError> {
        if self.include_header {
            self.write_row(&mut writer, candle_columns(view))?;
        }

        for c in candles {
            let start = c.bucket_start.to_string();
            let count = c.tick_count.to_string();
            match view {
                CandleView::Full => self.write_row(
                    &mut writer,
                    [
                        &start as &dyn Display,
                        &c.open,
                        &c.high,
                        &c.low,
                        &c.close,
                        &c.volume,
                        &count,
                    ],
                )?,
                CandleView::Ohlc => self.write_row(
                    &mut writer,
                    [&start as &dyn Display, &c.open, &c.high, &c.low, &c.close],
                )?,
                CandleView::Volume => {
                    self.write_row(&mut writer, [&start as &dyn Display, &c.volume])?;
                }
            }
        }

        Ok(())
    }
}

/// Column names of a candle table under `view`.
pub(crate) const fn candle_columns(view: CandleView) -> &'static [&'static str] {
    match view {
        CandleView::Full => &[
            "bucket_start",
            "open",
            "high",
            "low",
            "close",
            "volume",
            "tick_count",
        ],
        CandleView::Ohlc => &["bucket_start", "open", "high", "low", "close"],
        CandleView::Volume => &["bucket_start", "volume"],
    }
}

impl Formatter for CsvFormatter {
    fn write_records<W: Write + Send>(
        &self,
        records: &[TickRecord],
        mut writer: W,
    ) -> Result<(), FormatError> {
        if self.include_header {
            self.write_row(&mut writer, TickRecord::COLUMNS)?;
        }
        for record in records {
            self.write_row(&mut writer, record.fields())?;
        }
        Ok(())
    }

    fn write_candles<W: Write + Send>(
        &self,
        series: &CandleSeries,
        view: CandleView,
        writer: W,
    ) -> Result<(), FormatError> {
        match series {
            CandleSeries::Approximate(agg) => self.write_rows(&agg.candles, view, writer),
            CandleSeries::Exact(agg) => self.write_rows(&agg.candles, view, writer),
        }
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}
