//! Technical indicator implementations.
//!
//! This module provides:
//! - `BarTable`: bars plus named numeric columns aligned one-to-one by position
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSpec`: an indicator bound to the column name it writes
//! - `compute_indicators`: appends several independent columns at once
//!
//! Undefined values (warm-up rows) are `f64::NAN`.

pub mod adx;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use adx::{append_adx, calculate_adx, AdxColumns};
pub use ema::{append_ema, calculate_ema};
pub use macd::{append_macd, calculate_macd, MacdColumns};
pub use rsi::{append_rsi, calculate_rsi};
pub use sma::{append_sma, calculate_sma};

use crate::domain::ohlcv::{BarSeries, OhlcvBar};
use rayon::prelude::*;
use std::fmt;

/// Bar series enriched with derived columns.
///
/// Columns are kept in insertion order. Appending a column under a name that
/// already exists replaces the values in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarTable {
    bars: Vec<OhlcvBar>,
    columns: Vec<(String, Vec<f64>)>,
}

impl BarTable {
    pub fn new(bars: &[OhlcvBar]) -> Self {
        Self {
            bars: bars.to_vec(),
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Append (or replace) a column. Values are padded with NaN or truncated
    /// to the row count.
    pub fn with_column(mut self, name: &str, mut values: Vec<f64>) -> Self {
        values.resize(self.bars.len(), f64::NAN);
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        self
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Value of `name` at `row`, NaN when the column or row is missing.
    pub fn value(&self, name: &str, row: usize) -> f64 {
        self.column(name)
            .and_then(|c| c.get(row).copied())
            .unwrap_or(f64::NAN)
    }

    /// Value of `name` counted back from the last row (`back = 0` is the last row).
    pub fn value_back(&self, name: &str, back: usize) -> f64 {
        match self.len().checked_sub(back + 1) {
            Some(row) => self.value(name, row),
            None => f64::NAN,
        }
    }

    /// Difference of two columns, row by row.
    pub fn difference(&self, left: &str, right: &str) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.value(left, i) - self.value(right, i))
            .collect()
    }
}

impl From<&BarSeries> for BarTable {
    fn from(series: &BarSeries) -> Self {
        BarTable::new(series.bars())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Adx(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
        }
    }
}

/// An indicator and the column it writes. MACD ignores `column` and always
/// writes `macd_line`, `macd_signal` and `macd_histogram`; ADX writes
/// `column` plus `{column}_plus_di` and `{column}_minus_di`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub indicator: IndicatorType,
    pub column: String,
}

impl IndicatorSpec {
    pub fn new(indicator: IndicatorType, column: &str) -> Self {
        Self {
            indicator,
            column: column.to_string(),
        }
    }

    /// Compute this indicator's columns over `bars` without touching any table.
    pub fn compute(&self, bars: &[OhlcvBar]) -> Vec<(String, Vec<f64>)> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        match &self.indicator {
            IndicatorType::Sma(period) => {
                vec![(self.column.clone(), calculate_sma(&closes, *period))]
            }
            IndicatorType::Ema(period) => {
                vec![(self.column.clone(), calculate_ema(&closes, *period))]
            }
            IndicatorType::Rsi(period) => {
                vec![(self.column.clone(), calculate_rsi(&closes, *period))]
            }
            IndicatorType::Macd { fast, slow, signal } => {
                let macd = calculate_macd(&closes, *fast, *slow, *signal);
                vec![
                    (macd::LINE_COLUMN.to_string(), macd.line),
                    (macd::SIGNAL_COLUMN.to_string(), macd.signal),
                    (macd::HISTOGRAM_COLUMN.to_string(), macd.histogram),
                ]
            }
            IndicatorType::Adx(period) => {
                let adx = calculate_adx(bars, *period);
                vec![
                    (format!("{}_plus_di", self.column), adx.plus_di),
                    (format!("{}_minus_di", self.column), adx.minus_di),
                    (self.column.clone(), adx.adx),
                ]
            }
        }
    }
}

/// Compute independent indicator columns in parallel and append them in the
/// order given. Each column's own recursion runs sequentially.
pub fn compute_indicators(table: BarTable, specs: &[IndicatorSpec]) -> BarTable {
    let computed: Vec<Vec<(String, Vec<f64>)>> = specs
        .par_iter()
        .map(|spec| spec.compute(table.bars()))
        .collect();

    computed
        .into_iter()
        .flatten()
        .fold(table, |acc, (name, values)| acc.with_column(&name, values))
}
