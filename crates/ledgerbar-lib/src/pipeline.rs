//! End-to-end steps: collect into a store, load candles from a store.

use ledgerbar_aggregate::{CandleRequest, CandleSeries};
use ledgerbar_collect::{TickSource, collect};
use ledgerbar_format::TickStore;
use ledgerbar_types::Result;
use tracing::info;

/// Counts reported after a collection pass was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectSummary {
    /// Ticks written.
    pub ticks: usize,
    /// Distinct UTC dates.
    pub days: usize,
    /// Ticks whose volume lookup failed.
    pub unavailable: usize,
}

/// Runs a collection pass over `source` and replaces the store with it.
///
/// The store is only written once the whole pass succeeded.
///
/// # Errors
///
/// Returns an error if the pass aborts or the store cannot be written.
pub async fn collect_to_store<S, F>(
    source: &S,
    store: &TickStore,
    progress: F,
) -> Result<CollectSummary>
where
    S: TickSource + ?Sized,
    F: FnMut(u64, u64),
{
    let collection = collect(source, progress).await?;
    let summary = CollectSummary {
        ticks: collection.len(),
        days: collection.daily_index().len(),
        unavailable: collection.unavailable_count(),
    };
    store.write(&collection.into_records()).await?;
    Ok(summary)
}

/// Reads the store and aggregates it as `request` asks.
///
/// # Errors
///
/// Returns an error if the store cannot be read or aggregation rejects it.
pub async fn load_candles(store: &TickStore, request: &CandleRequest) -> Result<CandleSeries> {
    let records = store.read().await?;
    let series = request.execute(&records)?;
    info!(
        timeframe = %request.timeframe,
        mode = %request.mode,
        candles = series.len(),
        skipped = series.skipped().len(),
        "aggregated candles"
    );
    Ok(series)
}
