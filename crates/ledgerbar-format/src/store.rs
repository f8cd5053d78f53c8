//! CSV-backed persistence of collected tick records.

use futures::TryStreamExt;
use ledgerbar_types::TickRecord;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tracing::{debug, info};

use crate::FormatError;

/// Tick record file, fully replaced on every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickStore {
    path: PathBuf,
}

impl TickStore {
    /// Creates a store backed by the CSV file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file written before being renamed over the target.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("ticks"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replaces the file contents with `records`.
    ///
    /// Records are written to a temporary sibling file which is then renamed
    /// over the target, so readers see either the old or the new set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or renamed.
    pub async fn write(&self, records: &[TickRecord]) -> Result<(), FormatError> {
        let temp = self.temp_path();
        if let Err(e) = Self::write_file(&temp, records).await {
            // Best effort; the write error is what matters.
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        info!(path = %self.path.display(), records = records.len(), "wrote tick store");
        Ok(())
    }

    async fn write_file(path: &Path, records: &[TickRecord]) -> Result<(), FormatError> {
        let file = File::create(path).await?;
        let mut writer = csv_async::AsyncWriter::from_writer(file);
        writer.write_record(TickRecord::COLUMNS).await?;
        for record in records {
            writer.write_record(record.fields()).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    /// Reads every record and sorts them by timestamp.
    ///
    /// The file may have been edited or reordered outside ledgerbar, so the
    /// records are stable-sorted by [`TickRecord::timestamp_key`] here.
    /// Records whose timestamp does not parse sort first and are left for the
    /// aggregator to reject.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid CSV with
    /// the expected columns.
    pub async fn read(&self) -> Result<Vec<TickRecord>, FormatError> {
        let file = File::open(&self.path).await?;
        let mut reader = csv_async::AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .create_deserializer(file);
        let mut records: Vec<TickRecord> = reader.deserialize::<TickRecord>().try_collect().await?;

        let sorted = records
            .windows(2)
            .all(|w| w[0].timestamp_key() <= w[1].timestamp_key());
        if !sorted {
            debug!(path = %self.path.display(), "re-sorting tick records by timestamp");
            records.sort_by_key(TickRecord::timestamp_key);
        }
        info!(path = %self.path.display(), records = records.len(), "read tick store");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(index: u64, timestamp: &str, volume: &str) -> TickRecord {
        TickRecord {
            index: index.to_string(),
            timestamp: timestamp.to_string(),
            open: "100".to_string(),
            high: "120".to_string(),
            low: "90".to_string(),
            close: "110".to_string(),
            volume: volume.to_string(),
            utc_date: "1970-01-01".to_string(),
            daily_volume: "7".to_string(),
            daily_running_volume: "7".to_string(),
            cumulative_volume: "7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("ticks.csv"));
        let records = vec![
            create_test_record(1, "60", "7"),
            create_test_record(2, "120", "unavailable"),
            create_test_record(3, "180", "340282366920938463463374607431768211457"),
        ];

        store.write(&records).await.unwrap();
        let read = store.read().await.unwrap();

        assert_eq!(read, records);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_write_has_header_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("ticks.csv"));

        store
            .write(&[create_test_record(1, "60", "7"), create_test_record(2, "61", "7")])
            .await
            .unwrap();
        store
            .write(&[create_test_record(9, "90", "1")])
            .await
            .unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(TickRecord::COLUMNS.join(",").as_str()));
        assert_eq!(lines.count(), 1);

        let read = store.read().await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].index, "9");
    }

    #[tokio::test]
    async fn test_read_sorts_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("ticks.csv"));
        store
            .write(&[
                create_test_record(1, "300", "1"),
                create_test_record(2, "60", "1"),
                create_test_record(3, "60", "2"),
                create_test_record(4, "90.5", "1"),
            ])
            .await
            .unwrap();

        let read = store.read().await.unwrap();
        let order: Vec<_> = read.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(order, vec!["2", "3", "4", "1"]);
    }

    #[tokio::test]
    async fn test_read_orders_ticks_within_a_second() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("ticks.csv"));
        let tick = |index: u64, timestamp: &str, close: &str| TickRecord {
            close: close.to_string(),
            ..create_test_record(index, timestamp, "1")
        };
        store
            .write(&[tick(1, "90.7", "7"), tick(2, "90.2", "2")])
            .await
            .unwrap();

        let read = store.read().await.unwrap();
        let order: Vec<_> = read.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(order, vec!["90.2", "90.7"]);

        let series = ledgerbar_aggregate::aggregate_records(
            &read,
            60,
            ledgerbar_types::PrecisionMode::Approximate,
        )
        .unwrap();
        let ledgerbar_aggregate::CandleSeries::Approximate(agg) = series else {
            panic!("expected approximate candles");
        };
        assert_eq!(agg.candles.len(), 1);
        assert!((agg.candles[0].close - 7.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ticks.csv");
        // A non-empty directory cannot be replaced by a file.
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();
        let store = TickStore::new(&target);

        let result = store.write(&[create_test_record(1, "60", "1")]).await;

        assert!(matches!(result, Err(FormatError::Io(_))));
        assert!(!store.temp_path().exists());
        assert!(target.join("keep").exists());
    }

    #[tokio::test]
    async fn test_empty_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("ticks.csv"));
        store.write(&[]).await.unwrap();
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TickStore::new(dir.path().join("missing.csv"));
        assert!(matches!(store.read().await, Err(FormatError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_rejects_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.csv");
        std::fs::write(&path, "index,timestamp\n1,60\n").unwrap();
        let store = TickStore::new(path);
        assert!(matches!(store.read().await, Err(FormatError::Csv(_))));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = TickStore::new("/data/ticks.csv");
        assert_eq!(store.temp_path(), PathBuf::from("/data/ticks.csv.tmp"));
    }
}
