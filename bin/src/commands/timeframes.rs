//! Timeframes command implementation.

use ledgerbar_lib::prelude::*;

/// Print every supported candle width.
pub(crate) fn list_timeframes() {
    println!("{:<12} {:>8} {:<6}", "LABEL", "SECONDS", "CODE");
    println!("{}", "-".repeat(28));

    for timeframe in Timeframe::all() {
        println!(
            "{:<12} {:>8} {:<6}",
            timeframe.label(),
            timeframe.seconds(),
            short_code(*timeframe)
        );
    }
}

const fn short_code(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute1 => "1m",
        Timeframe::Minute5 => "5m",
        Timeframe::Minute15 => "15m",
        Timeframe::Minute30 => "30m",
        Timeframe::Hour1 => "1h",
        Timeframe::Hour4 => "4h",
        Timeframe::Hour12 => "12h",
        Timeframe::Day1 => "1d",
    }
}
