//! ledgerbar CLI - collect on-chain ticks and aggregate them into candles.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use ledgerbar_lib::OutputFormat;

#[derive(Parser)]
#[command(name = "ledgerbar")]
#[command(about = "Collect on-chain ticks and aggregate them into OHLCV candles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output and non-error logs)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect every tick from the indicator service into a tick store
    Collect {
        /// Indicator service base URL [env: LEDGERBAR_SOURCE_URL]
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Tick store path (fully overwritten)
        #[arg(short, long, default_value = "ticks.csv")]
        output: PathBuf,

        /// Minimum pause between requests in milliseconds [env: LEDGERBAR_REQUEST_INTERVAL_MS]
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Retry attempts per request [env: LEDGERBAR_MAX_RETRIES]
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Aggregate a tick store into candles
    Candles {
        /// Tick store path
        #[arg(short, long, default_value = "ticks.csv")]
        input: PathBuf,

        /// Candle width label (see `ledgerbar timeframes`)
        #[arg(short, long, default_value = "1 hour")]
        timeframe: String,

        /// Precision mode: approximate or exact
        #[arg(short, long)]
        mode: Option<String>,

        /// Candle view: full, ohlc or volume
        #[arg(long)]
        view: Option<String>,

        /// Output format: csv, json, ndjson or parquet. Inferred from --output when absent.
        #[arg(short, long, value_parser = display::parse_format)]
        format: Option<OutputFormat>,

        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported candle widths
    Timeframes,
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Collect {
            endpoint,
            output,
            interval_ms,
            max_retries,
        } => {
            commands::collect::collect(endpoint, output, interval_ms, max_retries, cli.quiet).await
        }
        Commands::Candles {
            input,
            timeframe,
            mode,
            view,
            format,
            output,
        } => {
            commands::candles::candles(
                input,
                &timeframe,
                mode.as_deref(),
                view.as_deref(),
                format,
                output,
            )
            .await
        }
        Commands::Timeframes => {
            commands::timeframes::list_timeframes();
            Ok(())
        }
    }
}
