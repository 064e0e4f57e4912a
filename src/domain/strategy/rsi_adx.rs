//! RSI extremes filtered by ADX trend strength.

use crate::domain::config_validation::{read_f64, read_period};
use crate::domain::error::TraderError;
use crate::domain::indicator::{compute_indicators, BarTable, IndicatorSpec, IndicatorType};
use crate::domain::strategy::{Signal, SignalStrategy};
use crate::ports::config_port::ConfigPort;
use tracing::debug;

pub const RSI: &str = "rsi";
pub const ADX: &str = "adx";

#[derive(Debug, Clone, PartialEq)]
pub struct RsiAdx {
    pub rsi_period: usize,
    pub adx_period: usize,
    pub overbought: f64,
    pub oversold: f64,
    pub adx_threshold: f64,
}

impl Default for RsiAdx {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            adx_period: 14,
            overbought: 70.0,
            oversold: 30.0,
            adx_threshold: 25.0,
        }
    }
}

impl RsiAdx {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let defaults = Self::default();
        let strategy = Self {
            rsi_period: read_period(config, "strategy", "rsi_period", defaults.rsi_period)?,
            adx_period: read_period(config, "strategy", "adx_period", defaults.adx_period)?,
            overbought: read_f64(config, "strategy", "rsi_overbought", defaults.overbought)?,
            oversold: read_f64(config, "strategy", "rsi_oversold", defaults.oversold)?,
            adx_threshold: read_f64(config, "strategy", "adx_threshold", defaults.adx_threshold)?,
        };
        if strategy.oversold >= strategy.overbought {
            return Err(TraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "rsi_oversold".into(),
                reason: "rsi_oversold must be below rsi_overbought".into(),
            });
        }
        Ok(strategy)
    }
}

impl SignalStrategy for RsiAdx {
    fn name(&self) -> &str {
        "RsiAdx"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn calculate_indicators(&self, table: BarTable) -> BarTable {
        let specs = [
            IndicatorSpec::new(IndicatorType::Rsi(self.rsi_period), RSI),
            IndicatorSpec::new(IndicatorType::Adx(self.adx_period), ADX),
        ];
        compute_indicators(table, &specs)
    }

    fn evaluate(&self, table: &BarTable) -> Signal {
        let rsi = table.value_back(RSI, 0);
        let adx = table.value_back(ADX, 0);
        debug!(rsi, adx, "rsi/adx levels");

        let trending = adx > self.adx_threshold;
        Signal::new(
            trending && rsi < self.oversold,
            trending && rsi > self.overbought,
        )
    }
}
