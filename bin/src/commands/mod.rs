//! CLI command implementations.

pub(crate) mod candles;
pub(crate) mod collect;
pub(crate) mod timeframes;
