//! Tick-to-candle aggregation.

use ledgerbar_types::{Amount, LedgerbarError, PrecisionMode, TickRecord, TimestampKey};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Approximate, Candle, Exact, Precision};

/// Errors that reject a whole aggregation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Bucket width is zero or does not fit in an `i64`.
    #[error("Invalid bucket width: {0} seconds")]
    InvalidWidth(u64),

    /// A record is older than the record accepted before it.
    #[error(
        "Record {index} has timestamp {timestamp}, earlier than preceding timestamp {previous}; ticks must be sorted by timestamp"
    )]
    OutOfOrder {
        /// Index column of the offending record.
        index: String,
        /// Its timestamp.
        timestamp: TimestampKey,
        /// Timestamp of the previously accepted record.
        previous: TimestampKey,
    },
}

impl From<AggregateError> for LedgerbarError {
    fn from(err: AggregateError) -> Self {
        Self::Aggregate(err.to_string())
    }
}

/// A record excluded from one aggregation call because a field did not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Record {index}: {field} {value:?} is not a valid {mode} value")]
pub struct MalformedRecord {
    /// Index column of the record.
    pub index: String,
    /// Name of the first field that failed to parse.
    pub field: &'static str,
    /// Raw text of that field.
    pub value: String,
    /// Precision mode the field was parsed under.
    pub mode: PrecisionMode,
}

/// Result of one aggregation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation<V> {
    /// Candles ordered by bucket start, one per non-empty bucket.
    pub candles: Vec<Candle<V>>,
    /// Records excluded as malformed, in input order.
    pub skipped: Vec<MalformedRecord>,
}

/// Candles produced under a precision mode chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum CandleSeries {
    /// Floating-point candles.
    Approximate(Aggregation<f64>),
    /// Exact integer candles.
    Exact(Aggregation<Amount>),
}

impl CandleSeries {
    /// Returns the precision mode of the series.
    #[must_use]
    pub const fn mode(&self) -> PrecisionMode {
        match self {
            Self::Approximate(_) => PrecisionMode::Approximate,
            Self::Exact(_) => PrecisionMode::Exact,
        }
    }

    /// Returns the number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Approximate(agg) => agg.candles.len(),
            Self::Exact(agg) => agg.candles.len(),
        }
    }

    /// Returns true if no candle was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the records excluded as malformed.
    #[must_use]
    pub fn skipped(&self) -> &[MalformedRecord] {
        match self {
            Self::Approximate(agg) => &agg.skipped,
            Self::Exact(agg) => &agg.skipped,
        }
    }
}

/// Aggregates timestamp-ordered records into candles under precision `P`.
///
/// Malformed records are skipped and reported in [`Aggregation::skipped`].
///
/// # Errors
///
/// Returns an error if the width is invalid or if an accepted record is older
/// than the one accepted before it. Records are never re-sorted here.
pub fn aggregate<P: Precision>(
    records: &[TickRecord],
    width_seconds: u64,
) -> Result<Aggregation<P::Value>, AggregateError> {
    let mut aggregator = CandleAggregator::<P>::new(width_seconds)?;
    for record in records {
        aggregator.process(record)?;
    }
    Ok(aggregator.finish())
}

/// Aggregates records under the precision mode selected at runtime.
///
/// # Errors
///
/// See [`aggregate`].
pub fn aggregate_records(
    records: &[TickRecord],
    width_seconds: u64,
    mode: PrecisionMode,
) -> Result<CandleSeries, AggregateError> {
    match mode {
        PrecisionMode::Approximate => {
            aggregate::<Approximate>(records, width_seconds).map(CandleSeries::Approximate)
        }
        PrecisionMode::Exact => aggregate::<Exact>(records, width_seconds).map(CandleSeries::Exact),
    }
}

/// Incremental candle aggregator.
///
/// Buckets are kept in a map keyed by bucket start, so emitted candles follow
/// key order rather than arrival order.
#[derive(Debug)]
pub struct CandleAggregator<P: Precision> {
    width: i64,
    buckets: BTreeMap<i64, CandleBuilder<P::Value>>,
    last_timestamp: Option<TimestampKey>,
    skipped: Vec<MalformedRecord>,
    precision: PhantomData<P>,
}

impl<P: Precision> CandleAggregator<P> {
    /// Creates an aggregator for buckets of `width_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the width is zero or larger than `i64::MAX`.
    pub fn new(width_seconds: u64) -> Result<Self, AggregateError> {
        let width = i64::try_from(width_seconds)
            .ok()
            .filter(|w| *w > 0)
            .ok_or(AggregateError::InvalidWidth(width_seconds))?;
        Ok(Self {
            width,
            buckets: BTreeMap::new(),
            last_timestamp: None,
            skipped: Vec::new(),
            precision: PhantomData,
        })
    }

    /// Returns the bucket width in seconds.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.width
    }

    /// Folds one record into its bucket.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::OutOfOrder`] if the record is older than the
    /// previously accepted one.
    pub fn process(&mut self, record: &TickRecord) -> Result<(), AggregateError> {
        let sample = match parse_record::<P>(record) {
            Ok(sample) => sample,
            Err(malformed) => {
                debug!(%malformed, "skipping malformed record");
                self.skipped.push(malformed);
                return Ok(());
            }
        };

        if let Some(previous) = self.last_timestamp
            && sample.timestamp < previous
        {
            return Err(AggregateError::OutOfOrder {
                index: record.index.clone(),
                timestamp: sample.timestamp,
                previous,
            });
        }

        let Some(bucket_start) = bucket_start(sample.timestamp.seconds(), self.width) else {
            let malformed = malformed_field::<P>(record, "timestamp", &record.timestamp);
            debug!(%malformed, "skipping record with unbucketable timestamp");
            self.skipped.push(malformed);
            return Ok(());
        };

        self.last_timestamp = Some(sample.timestamp);
        match self.buckets.get_mut(&bucket_start) {
            Some(builder) => builder.update::<P>(sample),
            None => {
                self.buckets
                    .insert(bucket_start, CandleBuilder::new(bucket_start, sample));
            }
        }
        Ok(())
    }

    /// Finishes aggregation, returning candles in bucket order.
    #[must_use]
    pub fn finish(self) -> Aggregation<P::Value> {
        if !self.skipped.is_empty() {
            warn!(
                skipped = self.skipped.len(),
                mode = %P::MODE,
                "excluded malformed records from aggregation"
            );
        }
        Aggregation {
            candles: self
                .buckets
                .into_values()
                .map(CandleBuilder::finish)
                .collect(),
            skipped: self.skipped,
        }
    }
}

/// Returns `floor(timestamp / width) * width`, or `None` on overflow.
fn bucket_start(timestamp: i64, width: i64) -> Option<i64> {
    timestamp.div_euclid(width).checked_mul(width)
}

/// A record's numeric fields parsed under one precision mode.
#[derive(Debug)]
struct Sample<V> {
    timestamp: TimestampKey,
    open: V,
    high: V,
    low: V,
    close: V,
    volume: V,
}

fn malformed_field<P: Precision>(
    record: &TickRecord,
    field: &'static str,
    value: &str,
) -> MalformedRecord {
    MalformedRecord {
        index: record.index.clone(),
        field,
        value: value.to_string(),
        mode: P::MODE,
    }
}

fn parse_record<P: Precision>(record: &TickRecord) -> Result<Sample<P::Value>, MalformedRecord> {
    let field = |name: &'static str, text: &str| {
        P::parse(text).ok_or_else(|| malformed_field::<P>(record, name, text))
    };

    let timestamp = P::parse_timestamp(&record.timestamp)
        .ok_or_else(|| malformed_field::<P>(record, "timestamp", &record.timestamp))?;
    let open = field("open", &record.open)?;
    let high = field("high", &record.high)?;
    let low = field("low", &record.low)?;
    let close = field("close", &record.close)?;
    // An unavailable volume is data, not a parse failure.
    let volume = if record.volume_unavailable() {
        P::zero()
    } else {
        field("volume", &record.volume)?
    };

    Ok(Sample {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// Builder for one candle.
#[derive(Debug)]
struct CandleBuilder<V> {
    bucket_start: i64,
    open: V,
    high: V,
    low: V,
    close: V,
    volume: V,
    tick_count: u64,
}

impl<V: PartialOrd> CandleBuilder<V> {
    /// Creates a new builder from the first sample of a bucket.
    fn new(bucket_start: i64, sample: Sample<V>) -> Self {
        Self {
            bucket_start,
            open: sample.open,
            high: sample.high,
            low: sample.low,
            close: sample.close,
            volume: sample.volume,
            tick_count: 1,
        }
    }

    /// Updates the builder with a later sample of the same bucket.
    fn update<P: Precision<Value = V>>(&mut self, sample: Sample<V>) {
        if sample.high > self.high {
            self.high = sample.high;
        }
        if sample.low < self.low {
            self.low = sample.low;
        }
        self.close = sample.close;
        P::accumulate(&mut self.volume, &sample.volume);
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Finishes building and returns the candle.
    fn finish(self) -> Candle<V> {
        Candle {
            bucket_start: self.bucket_start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            tick_count: self.tick_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    fn record(index: u64, timestamp: i64, ohlc: [&str; 4], volume: &str) -> TickRecord {
        let [open, high, low, close] = ohlc;
        TickRecord {
            index: index.to_string(),
            timestamp: timestamp.to_string(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
            volume: volume.to_string(),
            utc_date: "1970-01-01".to_string(),
            daily_volume: "0".to_string(),
            daily_running_volume: "0".to_string(),
            cumulative_volume: "0".to_string(),
        }
    }

    fn scenario_a() -> Vec<TickRecord> {
        vec![
            record(1, 0, ["10", "12", "9", "11"], "5"),
            record(2, 30, ["11", "15", "8", "13"], "5"),
            record(3, 90, ["13", "14", "12", "12"], "5"),
        ]
    }

    /// A deterministic walk of ticks with irregular gaps.
    fn walk(count: u64) -> Vec<TickRecord> {
        let mut timestamp = 1_704_067_200;
        (1..=count)
            .map(|i| {
                timestamp += i64::try_from(i * 37 % 173).unwrap();
                let base = 1_000 + (i * 7919) % 500;
                let high = base + i % 13;
                let low = base - i % 11;
                let close = low + (high - low) / 2;
                record(
                    i,
                    timestamp,
                    [
                        &base.to_string(),
                        &high.to_string(),
                        &low.to_string(),
                        &close.to_string(),
                    ],
                    &((i * 31) % 97).to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_two_buckets_approximate() {
        let agg = aggregate::<Approximate>(&scenario_a(), 60).unwrap();

        assert_eq!(agg.candles.len(), 2);
        let first = &agg.candles[0];
        assert_eq!(first.bucket_start, 0);
        assert_relative_eq!(first.open, 10.0);
        assert_relative_eq!(first.high, 15.0);
        assert_relative_eq!(first.low, 8.0);
        assert_relative_eq!(first.close, 13.0);
        assert_relative_eq!(first.volume, 10.0);
        assert_eq!(first.tick_count, 2);

        let second = &agg.candles[1];
        assert_eq!(second.bucket_start, 60);
        assert_relative_eq!(second.open, 13.0);
        assert_relative_eq!(second.close, 12.0);
        assert_relative_eq!(second.volume, 5.0);
        assert_eq!(second.tick_count, 1);
    }

    #[test]
    fn test_two_buckets_exact() {
        let agg = aggregate::<Exact>(&scenario_a(), 60).unwrap();

        assert_eq!(agg.candles.len(), 2);
        assert_eq!(agg.candles[0].volume, Amount::from(10));
        assert_eq!(agg.candles[0].high, Amount::from(15));
        assert_eq!(agg.candles[0].low, Amount::from(8));
        assert_eq!(agg.candles[1].volume, Amount::from(5));
    }

    #[test]
    fn test_single_tick_round_trips_exact_text() {
        let records = vec![record(1, 120, ["100", "120", "90", "110"], "7")];
        let agg = aggregate::<Exact>(&records, 60).unwrap();

        let candle = &agg.candles[0];
        assert_eq!(candle.open.to_string(), "100");
        assert_eq!(candle.close.to_string(), "110");
        assert_eq!(candle.high.to_string(), "120");
        assert_eq!(candle.low.to_string(), "90");
        assert_eq!(candle.volume.to_string(), "7");

        let json = serde_json::to_value(candle).unwrap();
        assert_eq!(json["open"], "100");
        assert_eq!(json["close"], "110");
        assert_eq!(json["high"], "120");
        assert_eq!(json["low"], "90");
        assert_eq!(json["volume"], "7");
    }

    #[test]
    fn test_unavailable_volume_counts_as_zero() {
        let records = vec![
            record(1, 0, ["10", "11", "9", "10"], "4"),
            record(2, 10, ["10", "30", "2", "25"], "unavailable"),
        ];

        let exact = aggregate::<Exact>(&records, 60).unwrap();
        assert!(exact.skipped.is_empty());
        let candle = &exact.candles[0];
        assert_eq!(candle.high, Amount::from(30));
        assert_eq!(candle.low, Amount::from(2));
        assert_eq!(candle.close, Amount::from(25));
        assert_eq!(candle.volume, Amount::from(4));
        assert_eq!(candle.tick_count, 2);

        let approximate = aggregate::<Approximate>(&records, 60).unwrap();
        assert_relative_eq!(approximate.candles[0].volume, 4.0);
    }

    #[test]
    fn test_unavailable_volume_alone_opens_bucket() {
        let records = vec![record(1, 0, ["10", "11", "9", "10"], "unavailable")];
        let agg = aggregate::<Exact>(&records, 60).unwrap();
        assert_eq!(agg.candles.len(), 1);
        assert!(agg.candles[0].volume.is_zero());
    }

    #[test]
    fn test_one_candle_per_distinct_bucket() {
        let records = walk(500);
        for width in [60, 300, 3600, 86_400] {
            let agg = aggregate::<Exact>(&records, width).unwrap();

            let expected: BTreeSet<i64> = records
                .iter()
                .map(|r| {
                    let ts: i64 = r.timestamp.parse().unwrap();
                    ts.div_euclid(width as i64) * width as i64
                })
                .collect();
            let starts: Vec<i64> = agg.candles.iter().map(|c| c.bucket_start).collect();

            assert_eq!(starts.len(), expected.len());
            assert_eq!(starts, expected.into_iter().collect::<Vec<_>>());
            assert!(starts.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_high_low_bound_open_close() {
        let records = walk(300);

        let exact = aggregate::<Exact>(&records, 300).unwrap();
        for c in &exact.candles {
            assert!(c.low <= c.open && c.low <= c.close && c.low <= c.high);
            assert!(c.high >= c.open && c.high >= c.close);
        }

        let approximate = aggregate::<Approximate>(&records, 300).unwrap();
        for c in &approximate.candles {
            assert!(c.low <= c.open && c.low <= c.close && c.low <= c.high);
            assert!(c.high >= c.open && c.high >= c.close);
        }
    }

    #[test]
    fn test_idempotent_output() {
        let records = walk(200);
        for mode in [PrecisionMode::Approximate, PrecisionMode::Exact] {
            let first = aggregate_records(&records, 900, mode).unwrap();
            let second = aggregate_records(&records, 900, mode).unwrap();
            assert_eq!(first, second);

            let (a, b) = match (&first, &second) {
                (CandleSeries::Approximate(a), CandleSeries::Approximate(b)) => (
                    serde_json::to_vec(&a.candles).unwrap(),
                    serde_json::to_vec(&b.candles).unwrap(),
                ),
                (CandleSeries::Exact(a), CandleSeries::Exact(b)) => (
                    serde_json::to_vec(&a.candles).unwrap(),
                    serde_json::to_vec(&b.candles).unwrap(),
                ),
                _ => panic!("mode changed between calls"),
            };
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_exact_volume_is_conserved() {
        // Each volume exceeds 2^64 and would lose digits through an f64.
        let volumes = [
            "18446744073709551617",
            "18446744073709551619",
            "unavailable",
            "123456789012345678901234567890",
            "1",
        ];
        let records: Vec<_> = volumes
            .iter()
            .enumerate()
            .map(|(i, v)| record(i as u64 + 1, i as i64 * 45, ["1", "1", "1", "1"], v))
            .collect();

        let agg = aggregate::<Exact>(&records, 60).unwrap();
        let from_candles: Amount = agg.candles.iter().map(|c| &c.volume).sum();
        let from_ticks: Amount = volumes
            .iter()
            .filter_map(|v| v.parse::<Amount>().ok())
            .collect::<Vec<_>>()
            .iter()
            .sum();

        assert_eq!(from_candles, from_ticks);
        assert_eq!(from_candles.to_string(), "123456789049239167048653671127");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let records = vec![
            record(1, 0, ["10", "12", "9", "11"], "5"),
            record(2, 10, ["abc", "12", "9", "11"], "5"),
            record(3, 20, ["10", "12", "9", "11"], "1.5"),
            record(4, 30, ["10", "12", "9", "11"], "5"),
        ];

        let exact = aggregate::<Exact>(&records, 60).unwrap();
        assert_eq!(exact.candles[0].tick_count, 2);
        assert_eq!(exact.candles[0].volume, Amount::from(10));
        assert_eq!(exact.skipped.len(), 2);
        assert_eq!(exact.skipped[0].index, "2");
        assert_eq!(exact.skipped[0].field, "open");
        assert_eq!(exact.skipped[1].field, "volume");
        assert_eq!(exact.skipped[1].mode, PrecisionMode::Exact);

        // A fractional volume is a valid float.
        let approximate = aggregate::<Approximate>(&records, 60).unwrap();
        assert_eq!(approximate.candles[0].tick_count, 3);
        assert_relative_eq!(approximate.candles[0].volume, 11.5);
        assert_eq!(approximate.skipped.len(), 1);
    }

    #[test]
    fn test_malformed_timestamp_is_skipped_before_order_check() {
        let records = vec![
            record(1, 100, ["1", "1", "1", "1"], "1"),
            TickRecord {
                timestamp: "yesterday".to_string(),
                ..record(2, 0, ["1", "1", "1", "1"], "1")
            },
            record(3, 110, ["1", "1", "1", "1"], "1"),
        ];
        let agg = aggregate::<Approximate>(&records, 60).unwrap();
        assert_eq!(agg.candles.len(), 1);
        assert_eq!(agg.skipped[0].field, "timestamp");
    }

    #[test]
    fn test_out_of_order_is_rejected() {
        let records = vec![
            record(1, 100, ["1", "1", "1", "1"], "1"),
            record(2, 40, ["1", "1", "1", "1"], "1"),
        ];
        let err = aggregate::<Exact>(&records, 60).unwrap_err();
        assert_eq!(
            err,
            AggregateError::OutOfOrder {
                index: "2".to_string(),
                timestamp: TimestampKey::whole(40),
                previous: TimestampKey::whole(100),
            }
        );
    }

    #[test]
    fn test_fractional_decrease_within_a_second_is_rejected() {
        let records = vec![
            TickRecord {
                timestamp: "90.7".to_string(),
                ..record(1, 0, ["7", "7", "7", "7"], "1")
            },
            TickRecord {
                timestamp: "90.2".to_string(),
                ..record(2, 0, ["2", "2", "2", "2"], "1")
            },
        ];
        let err = aggregate::<Approximate>(&records, 60).unwrap_err();
        assert!(matches!(err, AggregateError::OutOfOrder { ref index, .. } if index == "2"));
        assert!(err.to_string().contains("90.2"));
    }

    #[test]
    fn test_fractional_timestamps_close_on_latest_tick() {
        let records = vec![
            TickRecord {
                timestamp: "90.2".to_string(),
                ..record(1, 0, ["2", "2", "2", "2"], "1")
            },
            TickRecord {
                timestamp: "90.7".to_string(),
                ..record(2, 0, ["7", "7", "7", "7"], "1")
            },
        ];
        let agg = aggregate::<Approximate>(&records, 60).unwrap();
        assert_eq!(agg.candles[0].bucket_start, 60);
        assert_relative_eq!(agg.candles[0].open, 2.0);
        assert_relative_eq!(agg.candles[0].close, 7.0);
    }

    #[test]
    fn test_tick_count_passes_u32_range() {
        let sample = |close: f64| Sample {
            timestamp: TimestampKey::whole(0),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close,
            volume: 0.0,
        };
        let mut builder = CandleBuilder::new(0, sample(1.0));
        builder.tick_count = u64::from(u32::MAX);
        builder.update::<Approximate>(sample(2.0));

        let candle = builder.finish();
        assert_eq!(candle.tick_count, u64::from(u32::MAX) + 1);
        assert_relative_eq!(candle.close, 2.0);
    }

    #[test]
    fn test_equal_timestamps_are_in_order() {
        let records = vec![
            record(1, 60, ["5", "6", "4", "5"], "1"),
            record(2, 60, ["5", "9", "4", "8"], "1"),
        ];
        let agg = aggregate::<Exact>(&records, 60).unwrap();
        assert_eq!(agg.candles[0].close, Amount::from(8));
    }

    #[test]
    fn test_invalid_width() {
        assert_eq!(
            aggregate::<Exact>(&scenario_a(), 0).unwrap_err(),
            AggregateError::InvalidWidth(0)
        );
        assert_eq!(
            aggregate::<Approximate>(&scenario_a(), u64::MAX).unwrap_err(),
            AggregateError::InvalidWidth(u64::MAX)
        );
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate::<Exact>(&[], 60).unwrap();
        assert!(agg.candles.is_empty());
        assert!(agg.skipped.is_empty());
    }

    #[test]
    fn test_sparse_buckets_are_not_filled() {
        let records = vec![
            record(1, 0, ["1", "1", "1", "1"], "1"),
            record(2, 3600, ["1", "1", "1", "1"], "1"),
        ];
        let agg = aggregate::<Approximate>(&records, 60).unwrap();
        let starts: Vec<_> = agg.candles.iter().map(|c| c.bucket_start).collect();
        assert_eq!(starts, vec![0, 3600]);
    }

    #[test]
    fn test_negative_timestamps_floor() {
        let records = vec![
            record(1, -61, ["1", "1", "1", "1"], "1"),
            record(2, -1, ["1", "1", "1", "1"], "1"),
        ];
        let agg = aggregate::<Exact>(&records, 60).unwrap();
        let starts: Vec<_> = agg.candles.iter().map(|c| c.bucket_start).collect();
        assert_eq!(starts, vec![-120, -60]);
    }

    #[test]
    fn test_series_dispatch() {
        let series = aggregate_records(&scenario_a(), 60, PrecisionMode::Exact).unwrap();
        assert_eq!(series.mode(), PrecisionMode::Exact);
        assert_eq!(series.len(), 2);
        assert!(series.skipped().is_empty());

        let series = aggregate_records(&scenario_a(), 3600, PrecisionMode::Approximate).unwrap();
        assert_eq!(series.mode(), PrecisionMode::Approximate);
        assert_eq!(series.len(), 1);
    }
}
