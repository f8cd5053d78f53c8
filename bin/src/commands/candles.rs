//! Candles command implementation.

use crate::display::{resolve_format, write_candles};
use anyhow::{Context, Result, bail};
use ledgerbar_lib::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Aggregate the tick store at `input` and write the candles.
pub(crate) async fn candles(
    input: PathBuf,
    timeframe: &str,
    mode: Option<&str>,
    view: Option<&str>,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
) -> Result<()> {
    // Reject bad labels before touching the store.
    let request = CandleRequest::resolve(timeframe, mode, view)?;
    let format = resolve_format(format, output.as_deref());
    if format.is_binary() && output.is_none() {
        bail!("{format} output needs a file; pass --output");
    }

    let store = TickStore::new(&input);
    let series = pipeline::load_candles(&store, &request)
        .await
        .with_context(|| format!("Failed to load candles from {}", input.display()))?;

    write_candles(&series, request.view, format, output.as_deref())?;

    if let Some(path) = &output {
        info!(path = %path.display(), candles = series.len(), "wrote candles");
    }
    Ok(())
}
