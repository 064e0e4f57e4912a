//! Configuration reading and validation.
//!
//! `ConfigPort` getters fall back to a default on missing or unparsable
//! values. The typed readers here only default on a missing key, so a
//! malformed value surfaces as `ConfigInvalid` before any run starts.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::Timeframe;
use crate::domain::strategy;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    require_string(config, "backtest", "symbol")?;
    read_timeframe(config)?;
    validate_dates(config)?;
    validate_positive(config, "backtest", "initial_equity", 1000.0)?;
    validate_positive(config, "backtest", "lot_size", 0.01)?;
    validate_positive(config, "backtest", "pip_value_per_lot", 0.1)?;
    validate_non_negative(config, "backtest", "tp_pips", 5.0)?;
    validate_non_negative(config, "backtest", "sl_pips", 5.0)?;
    Ok(())
}

pub fn validate_symbol_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_positive(config, "symbol", "point", 0.00001)?;
    read_usize(config, "symbol", "stops_level", 0)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    strategy::build_strategy(config).map(|_| ())
}

pub fn validate_live_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    read_usize(config, "live", "check_interval_secs", 30)?;
    read_usize(config, "live", "sleep_after_trade_secs", 60)?;
    read_usize(config, "live", "deviation", 50)?;
    read_usize(config, "live", "magic", 123_456)?;
    read_period(config, "live", "bars", 100)?;
    Ok(())
}

/// Every section, in the order a run reads them.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_backtest_config(config)?;
    validate_symbol_config(config)?;
    validate_strategy_config(config)?;
    validate_live_config(config)
}

pub fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, TraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(TraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

pub fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a non-negative integer, got '{raw}'"),
        }),
    }
}

/// A lookback period: an integer of at least 1.
pub fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TraderError> {
    let value = read_usize(config, section, key, default)?;
    if value == 0 {
        return Err(TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be at least 1"),
        });
    }
    Ok(value)
}

pub fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(TraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got '{raw}'"),
            }),
        },
    }
}

pub fn read_timeframe(config: &dyn ConfigPort) -> Result<Timeframe, TraderError> {
    let raw = require_string(config, "backtest", "timeframe")?;
    raw.parse().map_err(|reason| TraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: "timeframe".to_string(),
        reason,
    })
}

/// `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD` meaning midnight.
pub fn read_datetime(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDateTime, TraderError> {
    let raw = require_string(config, section, key)?;
    parse_datetime(&raw).ok_or_else(|| TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {key} format, expected YYYY-MM-DD[ HH:MM:SS]"),
    })
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let start = read_datetime(config, "backtest", "start_date")?;
    let end = read_datetime(config, "backtest", "end_date")?;
    if start >= end {
        return Err(TraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), TraderError> {
    let value = read_f64(config, section, key, default)?;
    if value <= 0.0 {
        return Err(TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(())
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), TraderError> {
    let value = read_f64(config, section, key, default)?;
    if value < 0.0 {
        return Err(TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be non-negative"),
        });
    }
    Ok(())
}
