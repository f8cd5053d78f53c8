//! Display utilities and output formatting for the ledgerbar CLI.

use anyhow::{Context, Result};
use ledgerbar_lib::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Parses a `--format` value.
pub(crate) fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|_| {
        let names: Vec<String> = OutputFormat::all().iter().map(ToString::to_string).collect();
        format!("unknown format '{value}' (expected one of: {})", names.join(", "))
    })
}

/// Picks the explicit format, else the one named by the output extension, else CSV.
pub(crate) fn resolve_format(format: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    format
        .or_else(|| output.and_then(OutputFormat::from_path))
        .unwrap_or_default()
}

/// Write candles to `output`, or to stdout when no path is given.
///
/// Callers reject binary formats without a path.
pub(crate) fn write_candles(
    series: &CandleSeries,
    view: CandleView,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            format.write_candles(series, view, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut writer = BufWriter::new(io::stdout());
            format.write_candles(series, view, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_precedence() {
        let path = Path::new("candles.parquet");
        assert_eq!(
            resolve_format(Some(OutputFormat::Json), Some(path)),
            OutputFormat::Json
        );
        assert_eq!(resolve_format(None, Some(path)), OutputFormat::Parquet);
        assert_eq!(
            resolve_format(None, Some(Path::new("candles.out"))),
            OutputFormat::Csv
        );
        assert_eq!(resolve_format(None, None), OutputFormat::Csv);
    }

    #[test]
    fn test_parse_format_lists_choices() {
        assert_eq!(parse_format("JSONL").unwrap(), OutputFormat::Ndjson);
        let err = parse_format("xml").unwrap_err();
        assert!(err.contains("parquet"));
    }
}
