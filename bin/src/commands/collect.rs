//! Collect command implementation.
//!
//! This module runs one collection pass against the indicator service and
//! replaces the tick store with the result.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ledgerbar_lib::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

/// Collect every tick into the store at `output`.
pub(crate) async fn collect(
    endpoint: Option<String>,
    output: PathBuf,
    interval_ms: Option<u64>,
    max_retries: Option<u32>,
    quiet: bool,
) -> Result<()> {
    // Flags override the environment.
    let config = SourceConfig::from_env_with(SourceOverrides {
        endpoint,
        request_interval: interval_ms.map(Duration::from_millis),
        max_retries,
    })?;
    let client = IndicatorClient::new(config)?;
    let store = TickStore::new(&output);

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ticks ({percent}%) {msg}")?
                .progress_chars("=>-"),
        );
        pb.set_message(client.config().endpoint.clone());
        pb
    };

    let summary = pipeline::collect_to_store(&client, &store, |done, total| {
        progress.set_length(total);
        progress.set_position(done);
    })
    .await
    .context("Collection pass failed; tick store left unchanged")?;

    let finish_msg = if summary.unavailable > 0 {
        format!(
            "Collected {} ticks over {} days ({} volumes unavailable)",
            summary.ticks, summary.days, summary.unavailable
        )
    } else {
        format!("Collected {} ticks over {} days", summary.ticks, summary.days)
    };
    progress.finish_with_message(finish_msg);

    if !quiet {
        println!("Tick store written to: {}", output.display());
    }

    Ok(())
}
