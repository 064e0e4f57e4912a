//! RSI (Relative Strength Index) indicator.
//!
//! Average gain/loss are simple trailing means over n rows of close deltas.
//! The first row has no predecessor and counts as a zero change.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RS is unbounded and RSI = 100 (this includes a flat
//! window where avg_gain is also 0).
//!
//! Warmup: first (n-1) rows are NaN.

use crate::domain::indicator::BarTable;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    for i in (period - 1)..closes.len() {
        let start = i + 1 - period;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / period as f64;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

/// Append RSI(period) of the close prices as `column`.
pub fn append_rsi(table: BarTable, period: usize, column: &str) -> BarTable {
    let values = calculate_rsi(&table.closes(), period);
    table.with_column(column, values)
}
