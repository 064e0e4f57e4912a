#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use scalptrader::domain::backtest::BacktestConfig;
use scalptrader::domain::error::TraderError;
pub use scalptrader::domain::ohlcv::{BarSeries, OhlcvBar, Timeframe};
use scalptrader::ports::data_port::MarketDataPort;
use std::collections::HashMap;

pub struct MockMarketData {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn series(&self, symbol: &str, timeframe: Timeframe) -> Result<BarSeries, TraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => BarSeries::new(bars.clone()),
            _ => Err(TraderError::DataUnavailable {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            }),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BarSeries, TraderError> {
        Ok(self.series(symbol, timeframe)?.within(start, end))
    }

    fn fetch_latest(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, TraderError> {
        Ok(self.series(symbol, timeframe)?.tail(count))
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn at(index: usize) -> NaiveDateTime {
    start_time() + Duration::minutes(index as i64)
}

pub fn make_bar(index: usize, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        time: at(index),
        open,
        high,
        low,
        close,
        volume: Some(100),
    }
}

/// One-minute bars with `high`/`low` two points either side of the close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close, close + 0.00002, close - 0.00002, close))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> BarSeries {
    BarSeries::new(bars_from_closes(closes)).unwrap()
}

pub fn eurusd_config(bars: usize) -> BacktestConfig {
    BacktestConfig::new(
        "EURUSD",
        Timeframe::M1,
        start_time(),
        at(bars.max(1)),
    )
}
