//! Apache Parquet output format.

use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampSecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use ledgerbar_aggregate::{Candle, CandleSeries};
use ledgerbar_types::{Amount, CandleView, TickRecord};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;

use crate::csv::candle_columns;
use crate::{FormatError, Formatter};

/// Candle value types that map onto an Arrow column.
trait ValueColumn: Sized {
    fn data_type() -> DataType;
    fn column<'a>(values: impl Iterator<Item = &'a Self>) -> ArrayRef
    where
        Self: 'a;
}

impl ValueColumn for f64 {
    fn data_type() -> DataType {
        DataType::Float64
    }

    fn column<'a>(values: impl Iterator<Item = &'a Self>) -> ArrayRef {
        Arc::new(Float64Array::from(values.copied().collect::<Vec<_>>()))
    }
}

// Exact values stay decimal text; no Arrow integer type is wide enough.
impl ValueColumn for Amount {
    fn data_type() -> DataType {
        DataType::Utf8
    }

    fn column<'a>(values: impl Iterator<Item = &'a Self>) -> ArrayRef {
        Arc::new(StringArray::from(
            values.map(ToString::to_string).collect::<Vec<_>>(),
        ))
    }
}

/// Parquet formatter.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Creates the Arrow schema for tick records. Every column is text.
    fn record_schema() -> Schema {
        Schema::new(
            TickRecord::COLUMNS
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, false))
                .collect::<Vec<_>>(),
        )
    }

    /// Creates the Arrow schema for candles of value type `V` under `view`.
    fn candle_schema<V: ValueColumn>(view: CandleView) -> Schema {
        let fields = candle_columns(view)
            .iter()
            .map(|name| match *name {
                "bucket_start" => Field::new(
                    "bucket_start",
                    DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
                    false,
                ),
                "tick_count" => Field::new("tick_count", DataType::UInt64, false),
                value => Field::new(value, V::data_type(), false),
            })
            .collect::<Vec<_>>();
        Schema::new(fields)
    }

    /// Converts tick records to an Arrow RecordBatch.
    fn records_to_batch(
        schema: &Arc<Schema>,
        records: &[TickRecord],
    ) -> Result<RecordBatch, FormatError> {
        let columns = (0..TickRecord::COLUMNS.len())
            .map(|i| {
                Arc::new(StringArray::from(
                    records.iter().map(|r| r.fields()[i]).collect::<Vec<_>>(),
                )) as ArrayRef
            })
            .collect();

        RecordBatch::try_new(Arc::clone(schema), columns)
            .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    /// Converts candles to an Arrow RecordBatch.
    fn candles_to_batch<V: ValueColumn>(
        schema: &Arc<Schema>,
        view: CandleView,
        candles: &[Candle<V>],
    ) -> Result<RecordBatch, FormatError> {
        let columns = candle_columns(view)
            .iter()
            .map(|name| match *name {
                "bucket_start" => Arc::new(
                    TimestampSecondArray::from(
                        candles.iter().map(|c| c.bucket_start).collect::<Vec<_>>(),
                    )
                    .with_timezone("UTC"),
                ) as ArrayRef,
                "tick_count" => Arc::new(UInt64Array::from(
                    candles.iter().map(|c| c.tick_count).collect::<Vec<_>>(),
                )) as ArrayRef,
                "open" => V::column(candles.iter().map(|c| &c.open)),
                "high" => V::column(candles.iter().map(|c| &c.high)),
                "low" => V::column(candles.iter().map(|c| &c.low)),
                "close" => V::column(candles.iter().map(|c| &c.close)),
                _ => V::column(candles.iter().map(|c| &c.volume)),
            })
            .collect();

        RecordBatch::try_new(Arc::clone(schema), columns)
            .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Writes `rows` in row-group sized batches.
    fn write_chunks<W, T>(
        &self,
        schema: Arc<Schema>,
        rows: &[T],
        writer: W,
        to_batch: impl Fn(&Arc<Schema>, &[T]) -> Result<RecordBatch, FormatError>,
    ) -> Result<(), FormatError>
    where
        W: Write + Send,
    {
        let mut arrow_writer =
            ArrowWriter::try_new(writer, Arc::clone(&schema), Some(self.writer_properties()))
                .map_err(|e| FormatError::Parquet(e.to_string()))?;

        for chunk in rows.chunks(self.row_group_size.max(1)) {
            let batch = to_batch(&schema, chunk)?;
            arrow_writer
                .write(&batch)
                .map_err(|e| FormatError::Parquet(e.to_string()))?;
        }

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(())
    }

    fn write_series<W: Write + Send, V: ValueColumn>(
        &self,
        candles: &[Candle<V>],
        view: CandleView,
        writer: W,
    ) -> Result<(), FormatError> {
        let schema = Arc::new(Self::candle_schema::<V>(view));
        self.write_chunks(schema, candles, writer, |schema, chunk| {
            Self::candles_to_batch(schema, view, chunk)
        })
    }
}

impl Formatter for ParquetFormatter {
    fn write_records<W: Write + Send>(
        &self,
        records: &[TickRecord],
        writer: W,
    ) -> Result<(), FormatError> {
        let schema = Arc::new(Self::record_schema());
        self.write_chunks(schema, records, writer, Self::records_to_batch)
    }

    fn write_candles<W: Write + Send>(
        &self,
        series: &CandleSeries,
        view: CandleView,
        writer: W,
    ) -> Result<(), FormatError> {
        match series {
            CandleSeries::Approximate(agg) => self.write_series(&agg.candles, view, writer),
            CandleSeries::Exact(agg) => self.write_series(&agg.candles, view, writer),
        }
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}
