//! Sequential tick collection with running and finalized volume totals.

use chrono::NaiveDate;
use ledgerbar_types::{Amount, LedgerbarError, Tick, TickRecord, Volume, utc_date};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{SourceError, TickSource};

/// Structural lookup that failed during a collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// Reading the total tick count.
    TickCount,
    /// Reading the timestamp of a tick.
    Timestamp {
        /// Tick index.
        index: u64,
    },
    /// Reading the OHLC quadruple of a tick.
    Ohlc {
        /// Tick index.
        index: u64,
        /// Timestamp looked up.
        timestamp: i64,
    },
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TickCount => f.write_str("tick count"),
            Self::Timestamp { index } => write!(f, "timestamp of tick {index}"),
            Self::Ohlc { index, timestamp } => {
                write!(f, "OHLC of tick {index} at {timestamp}")
            }
        }
    }
}

/// Errors that abort a collection pass.
#[derive(Error, Debug)]
pub enum CollectError {
    /// A structurally required lookup failed.
    #[error("failed to fetch {stage}: {source}")]
    SourceFetch {
        /// What was being fetched.
        stage: FetchStage,
        /// Underlying source error.
        source: SourceError,
    },

    /// The source returned a timestamp older than the previous tick's.
    #[error("tick {index} has timestamp {timestamp}, earlier than the previous tick at {previous}")]
    OutOfOrder {
        /// Tick index.
        index: u64,
        /// Its timestamp.
        timestamp: i64,
        /// Timestamp of the previous tick.
        previous: i64,
    },

    /// The timestamp has no representable UTC date.
    #[error("tick {index} has timestamp {timestamp} outside the supported date range")]
    TimestampOutOfRange {
        /// Tick index.
        index: u64,
        /// Its timestamp.
        timestamp: i64,
    },
}

impl From<CollectError> for LedgerbarError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::SourceFetch { .. } => Self::SourceFetch(err.to_string()),
            CollectError::OutOfOrder { .. } | CollectError::TimestampOutOfRange { .. } => {
                Self::Collect(err.to_string())
            }
        }
    }
}

/// Snapshot of the running totals taken right after a tick was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningTotals {
    /// Volume of the tick's UTC date so far.
    pub daily: Amount,
    /// Volume since the start of the pass.
    pub cumulative: Amount,
}

/// Running volume accumulator owned by one collection pass.
///
/// The daily total resets whenever a tick's UTC date differs from the
/// previous tick's, including ticks whose volume is unavailable.
#[derive(Debug, Clone, Default)]
pub struct RunningVolume {
    current_day: Option<NaiveDate>,
    daily: Amount,
    cumulative: Amount,
}

impl RunningVolume {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one tick into the totals and returns the resulting snapshot.
    pub fn observe(&mut self, date: NaiveDate, volume: &Volume) -> RunningTotals {
        if self.current_day != Some(date) {
            self.current_day = Some(date);
            self.daily = Amount::zero();
        }
        if let Some(amount) = volume.amount() {
            self.daily += amount;
            self.cumulative += amount;
        }
        RunningTotals {
            daily: self.daily.clone(),
            cumulative: self.cumulative.clone(),
        }
    }

    /// Returns the UTC date of the most recent tick.
    #[must_use]
    pub const fn current_day(&self) -> Option<NaiveDate> {
        self.current_day
    }

    /// Returns the running total of the current date.
    #[must_use]
    pub const fn daily(&self) -> &Amount {
        &self.daily
    }

    /// Returns the running total since the start of the pass.
    #[must_use]
    pub const fn cumulative(&self) -> &Amount {
        &self.cumulative
    }
}

/// A collected tick with its UTC date and running totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedTick {
    /// The raw tick.
    pub tick: Tick,
    /// UTC date of the tick's timestamp.
    pub date: NaiveDate,
    /// Running totals right after this tick.
    pub running: RunningTotals,
}

/// Finalized volume per UTC date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyVolumeIndex {
    totals: BTreeMap<NaiveDate, Amount>,
}

impl DailyVolumeIndex {
    /// Builds the index from a complete tick set.
    ///
    /// Every date with at least one tick gets an entry, zero when none of its
    /// volumes were available.
    #[must_use]
    pub fn from_ticks(ticks: &[CollectedTick]) -> Self {
        let mut totals: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
        for collected in ticks {
            let total = totals.entry(collected.date).or_default();
            if let Some(amount) = collected.tick.volume.amount() {
                *total += amount;
            }
        }
        Self { totals }
    }

    /// Returns the finalized total for `date`.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&Amount> {
        self.totals.get(&date)
    }

    /// Returns the number of dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns true if no date has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterates dates in ascending order with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Amount)> {
        self.totals.iter()
    }
}

/// Output of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    ticks: Vec<CollectedTick>,
    daily: DailyVolumeIndex,
}

impl Collection {
    /// Assembles a collection, building the daily index from `ticks`.
    #[must_use]
    pub fn new(ticks: Vec<CollectedTick>) -> Self {
        let daily = DailyVolumeIndex::from_ticks(&ticks);
        Self { ticks, daily }
    }

    /// Returns the collected ticks in index order.
    #[must_use]
    pub fn ticks(&self) -> &[CollectedTick] {
        &self.ticks
    }

    /// Returns the finalized daily totals.
    #[must_use]
    pub const fn daily_index(&self) -> &DailyVolumeIndex {
        &self.daily
    }

    /// Returns the number of ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns true if the pass collected nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Returns how many ticks have an unavailable volume.
    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.ticks
            .iter()
            .filter(|c| !c.tick.volume.is_available())
            .count()
    }

    /// Converts the collection into persisted records.
    #[must_use]
    pub fn into_records(self) -> Vec<TickRecord> {
        let daily = self.daily;
        self.ticks
            .into_iter()
            .map(|collected| {
                let day_total = daily.get(collected.date).cloned().unwrap_or_default();
                let CollectedTick {
                    tick,
                    date,
                    running,
                } = collected;
                TickRecord {
                    index: tick.index.to_string(),
                    timestamp: tick.timestamp.to_string(),
                    open: tick.ohlc.open.to_string(),
                    high: tick.ohlc.high.to_string(),
                    low: tick.ohlc.low.to_string(),
                    close: tick.ohlc.close.to_string(),
                    volume: tick.volume.to_string(),
                    utc_date: date.format("%Y-%m-%d").to_string(),
                    daily_volume: day_total.to_string(),
                    daily_running_volume: running.daily.to_string(),
                    cumulative_volume: running.cumulative.to_string(),
                }
            })
            .collect()
    }
}

/// Runs one collection pass over `source`.
///
/// Ticks are fetched strictly in index order, one request at a time.
/// `progress(done, total)` is called after every tick.
///
/// # Errors
///
/// Returns an error if the tick count, a timestamp or an OHLC lookup fails, or
/// if timestamps go backwards. A failed volume lookup is recorded as
/// [`Volume::Unavailable`] instead.
pub async fn collect<S, F>(source: &S, mut progress: F) -> Result<Collection, CollectError>
where
    S: TickSource + ?Sized,
    F: FnMut(u64, u64),
{
    let total = source
        .tick_count()
        .await
        .map_err(|source| CollectError::SourceFetch {
            stage: FetchStage::TickCount,
            source,
        })?;
    info!(total, "starting collection pass");
    if total == 0 {
        return Ok(Collection::default());
    }

    let mut running = RunningVolume::new();
    let mut ticks = Vec::new();
    let mut previous: Option<i64> = None;

    for index in 1..=total {
        let timestamp =
            source
                .timestamp(index)
                .await
                .map_err(|source| CollectError::SourceFetch {
                    stage: FetchStage::Timestamp { index },
                    source,
                })?;
        if let Some(previous) = previous
            && timestamp < previous
        {
            return Err(CollectError::OutOfOrder {
                index,
                timestamp,
                previous,
            });
        }
        previous = Some(timestamp);

        let date =
            utc_date(timestamp).ok_or(CollectError::TimestampOutOfRange { index, timestamp })?;

        let ohlc = source
            .ohlc(timestamp)
            .await
            .map_err(|source| CollectError::SourceFetch {
                stage: FetchStage::Ohlc { index, timestamp },
                source,
            })?;

        let volume = match source.volume(timestamp).await {
            Ok(amount) => Volume::Available(amount),
            Err(e) => {
                warn!(index, timestamp, error = %e, "volume unavailable");
                Volume::Unavailable
            }
        };

        let totals = running.observe(date, &volume);
        debug!(index, timestamp, %volume, daily = %totals.daily, "collected tick");
        ticks.push(CollectedTick {
            tick: Tick::new(index, timestamp, ohlc, volume),
            date,
            running: totals,
        });
        progress(index, total);
    }

    let collection = Collection::new(ticks);
    info!(
        ticks = collection.len(),
        days = collection.daily_index().len(),
        unavailable = collection.unavailable_count(),
        cumulative = %running.cumulative(),
        "collection pass finished"
    );
    Ok(collection)
}
