//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(V[i-n+1..=i]). Warmup: first (n-1) rows are NaN.

use crate::domain::indicator::BarTable;

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = window.iter().sum::<f64>() / period as f64;
    }

    out
}

/// Append SMA(period) of the close prices as `column`.
pub fn append_sma(table: BarTable, period: usize, column: &str) -> BarTable {
    let values = calculate_sma(&table.closes(), period);
    table.with_column(column, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup() {
        let sma = calculate_sma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(sma[0].is_nan());
        assert!(sma[1].is_nan());
        assert!((sma[2] - 20.0).abs() < f64::EPSILON);
        assert!((sma[3] - 30.0).abs() < f64::EPSILON);
        assert!((sma[4] - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_1_is_the_input() {
        assert_eq!(calculate_sma(&[3.0, 4.0], 1), vec![3.0, 4.0]);
    }

    #[test]
    fn sma_shorter_than_period_is_all_nan() {
        let sma = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(sma.len(), 2);
        assert!(sma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_period_0() {
        assert!(calculate_sma(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
