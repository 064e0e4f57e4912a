//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs seed from their first value, so every row is defined.

use crate::domain::indicator::{calculate_ema, BarTable};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub const LINE_COLUMN: &str = "macd_line";
pub const SIGNAL_COLUMN: &str = "macd_signal";
pub const HISTOGRAM_COLUMN: &str = "macd_histogram";

#[derive(Debug, Clone, PartialEq)]
pub struct MacdColumns {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdColumns {
    if fast == 0 || slow == 0 || signal_period == 0 {
        let undefined = vec![f64::NAN; closes.len()];
        return MacdColumns {
            line: undefined.clone(),
            signal: undefined.clone(),
            histogram: undefined,
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&line, signal_period);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdColumns {
        line,
        signal,
        histogram,
    }
}

/// Append `macd_line`, `macd_signal` and `macd_histogram`.
pub fn append_macd(table: BarTable, fast: usize, slow: usize, signal_period: usize) -> BarTable {
    let macd = calculate_macd(&table.closes(), fast, slow, signal_period);
    table
        .with_column(LINE_COLUMN, macd.line)
        .with_column(SIGNAL_COLUMN, macd.signal)
        .with_column(HISTOGRAM_COLUMN, macd.histogram)
}
