//! Symbol metadata and take-profit/stop-loss price levels.
//!
//! Pip size is ten raw price points. The venue's minimum stop distance is
//! `stops_level` points; a TP or SL closer to the entry price than that is
//! pushed out to exactly the minimum, keeping its side of the price.

use crate::domain::config_validation::{read_f64, read_usize};
use crate::domain::error::TraderError;
use crate::domain::position::Side;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolInfo {
    pub point: f64,
    pub stops_level: u32,
}

impl SymbolInfo {
    pub fn pip_size(&self) -> f64 {
        self.point * 10.0
    }

    pub fn min_stop_distance(&self) -> f64 {
        self.stops_level as f64 * self.point
    }

    /// `[symbol] point` and `stops_level`, defaulting to a five-digit quote.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let defaults = Self::default();
        let stops_level = read_usize(config, "symbol", "stops_level", 0)?;
        let stops_level = u32::try_from(stops_level).map_err(|_| TraderError::ConfigInvalid {
            section: "symbol".into(),
            key: "stops_level".into(),
            reason: format!("{stops_level} is out of range"),
        })?;
        Ok(SymbolInfo {
            point: read_f64(config, "symbol", "point", defaults.point)?,
            stops_level,
        })
    }
}

impl Default for SymbolInfo {
    fn default() -> Self {
        SymbolInfo {
            point: 0.00001,
            stops_level: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLevels {
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// TP/SL prices for an entry at `price`, `tp_pips`/`sl_pips` away.
pub fn compute_stop_levels(
    side: Side,
    price: f64,
    tp_pips: f64,
    sl_pips: f64,
    symbol: &SymbolInfo,
) -> Result<StopLevels, TraderError> {
    if !(symbol.point.is_finite() && symbol.point > 0.0) {
        return Err(invalid(format!("point must be positive, got {}", symbol.point)));
    }
    if !(price.is_finite() && price > 0.0) {
        return Err(invalid(format!("entry price must be positive, got {price}")));
    }
    for (name, pips) in [("tp_pips", tp_pips), ("sl_pips", sl_pips)] {
        if !(pips.is_finite() && pips >= 0.0) {
            return Err(invalid(format!("{name} must be non-negative, got {pips}")));
        }
    }

    let sign = side.sign();
    let pip = symbol.pip_size();
    let min_distance = symbol.min_stop_distance();

    let mut take_profit = price + sign * tp_pips * pip;
    let mut stop_loss = price - sign * sl_pips * pip;

    if (take_profit - price).abs() < min_distance {
        take_profit = price + sign * min_distance;
    }
    if (stop_loss - price).abs() < min_distance {
        stop_loss = price - sign * min_distance;
    }

    // rounding slack when re-measuring a clamped distance
    let tolerance = 4.0 * f64::EPSILON * price;
    if min_distance > 0.0 {
        let tp_distance = (take_profit - price).abs();
        let sl_distance = (stop_loss - price).abs();
        if tp_distance + tolerance < min_distance || sl_distance + tolerance < min_distance {
            return Err(invalid(format!(
                "TP {take_profit} / SL {stop_loss} within minimum stop distance {min_distance} of {price}"
            )));
        }
    }
    if sign * (take_profit - price) < 0.0 || sign * (price - stop_loss) < 0.0 {
        return Err(invalid(format!(
            "TP {take_profit} / SL {stop_loss} on the wrong side of {price} for a {side}"
        )));
    }

    Ok(StopLevels {
        take_profit,
        stop_loss,
    })
}

fn invalid(reason: String) -> TraderError {
    TraderError::InvalidStopConfiguration { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eurusd(stops_level: u32) -> SymbolInfo {
        SymbolInfo {
            point: 0.00001,
            stops_level,
        }
    }

    #[test]
    fn pip_size_is_ten_points() {
        assert!((eurusd(0).pip_size() - 0.0001).abs() < 1e-15);
        assert!((eurusd(20).min_stop_distance() - 0.0002).abs() < 1e-15);
    }

    #[test]
    fn buy_levels() {
        let levels = compute_stop_levels(Side::Buy, 1.1000, 5.0, 3.0, &eurusd(0)).unwrap();
        assert!((levels.take_profit - 1.1005).abs() < 1e-12);
        assert!((levels.stop_loss - 1.0997).abs() < 1e-12);
    }

    #[test]
    fn sell_levels() {
        let levels = compute_stop_levels(Side::Sell, 1.1000, 5.0, 3.0, &eurusd(0)).unwrap();
        assert!((levels.take_profit - 1.0995).abs() < 1e-12);
        assert!((levels.stop_loss - 1.1003).abs() < 1e-12);
    }

    #[test]
    fn clamps_inside_minimum_distance() {
        // 1 pip = 10 points, broker minimum 30 points
        let levels = compute_stop_levels(Side::Buy, 1.1000, 1.0, 1.0, &eurusd(30)).unwrap();
        assert!((levels.take_profit - 1.1003).abs() < 1e-12);
        assert!((levels.stop_loss - 1.0997).abs() < 1e-12);

        let levels = compute_stop_levels(Side::Sell, 1.1000, 1.0, 10.0, &eurusd(30)).unwrap();
        assert!((levels.take_profit - 1.0997).abs() < 1e-12);
        assert!((levels.stop_loss - 1.1010).abs() < 1e-12);
    }

    #[test]
    fn zero_pips_clamp_to_minimum() {
        let levels = compute_stop_levels(Side::Sell, 1.2, 0.0, 0.0, &eurusd(50)).unwrap();
        assert!(levels.take_profit < 1.2);
        assert!(levels.stop_loss > 1.2);
    }

    #[test]
    fn rejects_negative_pips() {
        let err = compute_stop_levels(Side::Buy, 1.1, -1.0, 5.0, &eurusd(0)).unwrap_err();
        assert!(matches!(err, TraderError::InvalidStopConfiguration { .. }));
    }

    #[test]
    fn from_config_reads_symbol_section() {
        let config = crate::adapters::file_config_adapter::FileConfigAdapter::from_string(
            "[symbol]\npoint = 0.001\nstops_level = 15\n",
        )
        .unwrap();
        let info = SymbolInfo::from_config(&config).unwrap();
        assert_eq!(info.point, 0.001);
        assert_eq!(info.stops_level, 15);

        let empty = crate::adapters::file_config_adapter::FileConfigAdapter::from_string("").unwrap();
        assert_eq!(SymbolInfo::from_config(&empty).unwrap(), SymbolInfo::default());
    }

    #[test]
    fn rejects_bad_price_and_point() {
        assert!(compute_stop_levels(Side::Buy, 0.0, 5.0, 5.0, &eurusd(0)).is_err());
        assert!(compute_stop_levels(Side::Buy, f64::NAN, 5.0, 5.0, &eurusd(0)).is_err());
        let bad = SymbolInfo {
            point: 0.0,
            stops_level: 0,
        };
        assert!(compute_stop_levels(Side::Buy, 1.1, 5.0, 5.0, &bad).is_err());
    }
}
