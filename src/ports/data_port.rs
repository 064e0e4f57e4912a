//! Market data port.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::{BarSeries, Timeframe};
use chrono::NaiveDateTime;

/// Source of ordered bar series. An empty answer is
/// `TraderError::DataUnavailable`, which callers treat as retryable.
pub trait MarketDataPort {
    /// Bars with `start <= time <= end`.
    fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BarSeries, TraderError>;

    /// The most recent `count` bars.
    fn fetch_latest(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, TraderError>;
}
