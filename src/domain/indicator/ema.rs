//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded from the first value (no SMA seeding window):
//! EMA[0] = V[0], EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! Leading NaN inputs stay NaN; the first finite value seeds the recursion.
//! An interior NaN input carries the previous EMA forward.

use crate::domain::indicator::BarTable;

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    for (i, &value) in values.iter().enumerate() {
        ema = match (ema, value.is_finite()) {
            (None, true) => Some(value),
            (None, false) => None,
            (Some(prev), true) => Some(value * k + prev * (1.0 - k)),
            (Some(prev), false) => Some(prev),
        };
        if let Some(v) = ema {
            out[i] = v;
        }
    }

    out
}

/// Append EMA(period) of the close prices as `column`.
pub fn append_ema(table: BarTable, period: usize, column: &str) -> BarTable {
    let values = calculate_ema(&table.closes(), period);
    table.with_column(column, values)
}
