//! ADX (Average Directional Index) indicator.
//!
//! TR  = max(H-L, |H-prevC|, |L-prevC|), TR[0] = H-L
//! +DM = H-prevH when it is positive and strictly greater than prevL-L, else 0
//! -DM = prevL-L when it is positive and strictly greater than H-prevH, else 0
//! TR, +DM and -DM are smoothed with EMA(n).
//! +DI = 100 * EMA(+DM) / EMA(TR), -DI likewise (0 when EMA(TR) is 0)
//! DX  = 100 * |+DI - -DI| / (+DI + -DI) (0 when the sum is 0)
//! ADX = EMA(DX, n)
//!
//! Warmup: rows before index n are NaN.

use crate::domain::indicator::{calculate_ema, BarTable};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxColumns {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> AdxColumns {
    let n = bars.len();
    if period == 0 || n <= period {
        let undefined = vec![f64::NAN; n];
        return AdxColumns {
            plus_di: undefined.clone(),
            minus_di: undefined.clone(),
            adx: undefined,
        };
    }

    let mut tr = Vec::with_capacity(n);
    let mut plus_dm = Vec::with_capacity(n);
    let mut minus_dm = Vec::with_capacity(n);
    tr.push(bars[0].high - bars[0].low);
    plus_dm.push(0.0);
    minus_dm.push(0.0);

    for pair in bars.windows(2) {
        let (prev, bar) = (&pair[0], &pair[1]);
        tr.push(bar.true_range(prev.close));

        let up = bar.high - prev.high;
        let down = prev.low - bar.low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let smoothed_tr = calculate_ema(&tr, period);
    let smoothed_plus = calculate_ema(&plus_dm, period);
    let smoothed_minus = calculate_ema(&minus_dm, period);

    let mut plus_di = Vec::with_capacity(n);
    let mut minus_di = Vec::with_capacity(n);
    let mut dx = Vec::with_capacity(n);
    for i in 0..n {
        let (pdi, mdi) = if smoothed_tr[i] > 0.0 {
            (
                100.0 * smoothed_plus[i] / smoothed_tr[i],
                100.0 * smoothed_minus[i] / smoothed_tr[i],
            )
        } else {
            (0.0, 0.0)
        };
        let sum = pdi + mdi;
        dx.push(if sum > 0.0 {
            100.0 * (pdi - mdi).abs() / sum
        } else {
            0.0
        });
        plus_di.push(pdi);
        minus_di.push(mdi);
    }

    let mut adx = calculate_ema(&dx, period);
    for column in [&mut plus_di, &mut minus_di, &mut adx] {
        column[..period].fill(f64::NAN);
    }

    AdxColumns {
        plus_di,
        minus_di,
        adx,
    }
}

/// Append `{column}_plus_di`, `{column}_minus_di` and `column` (the ADX).
pub fn append_adx(table: BarTable, period: usize, column: &str) -> BarTable {
    let adx = calculate_adx(table.bars(), period);
    table
        .with_column(&format!("{column}_plus_di"), adx.plus_di)
        .with_column(&format!("{column}_minus_di"), adx.minus_di)
        .with_column(column, adx.adx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(minute: u32, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            time: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, minute, 0)
                .unwrap(),
            open: close,
            high,
            low,
            close,
            volume: None,
        }
    }

    fn trending_up(n: u32) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                make_bar(i, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect()
    }

    #[test]
    fn adx_warmup() {
        let adx = calculate_adx(&trending_up(10), 3);
        for i in 0..3 {
            assert!(adx.adx[i].is_nan());
            assert!(adx.plus_di[i].is_nan());
        }
        for i in 3..10 {
            assert!(adx.adx[i].is_finite());
        }
    }

    #[test]
    fn adx_short_series_is_undefined() {
        let adx = calculate_adx(&trending_up(3), 3);
        assert_eq!(adx.adx.len(), 3);
        assert!(adx.adx.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn adx_zero_period() {
        let adx = calculate_adx(&trending_up(5), 0);
        assert!(adx.adx.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn uptrend_has_dominant_plus_di() {
        let adx = calculate_adx(&trending_up(30), 5);
        assert!(adx.plus_di[29] > adx.minus_di[29]);
        assert!(adx.minus_di[29].abs() < f64::EPSILON);
        assert!(adx.adx[29] > 50.0);
        assert!(adx.adx[29] <= 100.0);
    }

    #[test]
    fn flat_bars_have_zero_dx() {
        // no range and no movement: TR is 0 everywhere, DI and DX fall back to 0
        let bars: Vec<OhlcvBar> = (0..8).map(|i| make_bar(i, 1.0, 1.0, 1.0)).collect();
        let adx = calculate_adx(&bars, 3);
        for i in 3..8 {
            assert_eq!(adx.adx[i], 0.0);
            assert_eq!(adx.plus_di[i], 0.0);
            assert_eq!(adx.minus_di[i], 0.0);
        }
    }

    #[test]
    fn outside_bar_counts_neither_direction_when_equal() {
        // high +1 and low -1: movements tie, both DMs are zeroed
        let bars = vec![
            make_bar(0, 10.0, 9.0, 9.5),
            make_bar(1, 11.0, 8.0, 9.5),
            make_bar(2, 11.0, 8.0, 9.5),
        ];
        let adx = calculate_adx(&bars, 1);
        assert_eq!(adx.plus_di[1], 0.0);
        assert_eq!(adx.minus_di[1], 0.0);
        assert_eq!(adx.adx[1], 0.0);
    }

    #[test]
    fn append_adx_names_columns() {
        let table = append_adx(BarTable::new(&trending_up(6)), 2, "adx");
        assert_eq!(table.column_names(), vec!["adx_plus_di", "adx_minus_di", "adx"]);
    }
}
