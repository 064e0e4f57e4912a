//! Moving-average ordering strategy.
//!
//! Level-triggered, not edge-triggered: it signals on every bar where the
//! short average sits strictly above (buy) or below (sell) the long one.

use crate::domain::config_validation::read_period;
use crate::domain::error::TraderError;
use crate::domain::indicator::{compute_indicators, BarTable, IndicatorSpec, IndicatorType};
use crate::domain::strategy::ema_crossover::validate_periods;
use crate::domain::strategy::{Signal, SignalStrategy};
use crate::ports::config_port::ConfigPort;

pub const SHORT_MA: &str = "short_ma";
pub const LONG_MA: &str = "long_ma";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaKind {
    #[default]
    Exponential,
    Simple,
}

impl MaKind {
    fn indicator(&self, period: usize) -> IndicatorType {
        match self {
            MaKind::Exponential => IndicatorType::Ema(period),
            MaKind::Simple => IndicatorType::Sma(period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    short_period: usize,
    long_period: usize,
    kind: MaKind,
}

impl MovingAverage {
    pub fn new(short_period: usize, long_period: usize, kind: MaKind) -> Result<Self, TraderError> {
        validate_periods(short_period, long_period)?;
        Ok(Self {
            short_period,
            long_period,
            kind,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let short = read_period(config, "strategy", "short_period", 5)?;
        let long = read_period(config, "strategy", "long_period", 20)?;
        let kind = match config
            .get_string("strategy", "ma_kind")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("ema") => MaKind::Exponential,
            Some("sma") => MaKind::Simple,
            Some(other) => {
                return Err(TraderError::ConfigInvalid {
                    section: "strategy".into(),
                    key: "ma_kind".into(),
                    reason: format!("expected ema or sma, got '{other}'"),
                });
            }
        };
        Self::new(short, long, kind)
    }
}

impl SignalStrategy for MovingAverage {
    fn name(&self) -> &str {
        "MovingAverage"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn calculate_indicators(&self, table: BarTable) -> BarTable {
        let specs = [
            IndicatorSpec::new(self.kind.indicator(self.short_period), SHORT_MA),
            IndicatorSpec::new(self.kind.indicator(self.long_period), LONG_MA),
        ];
        compute_indicators(table, &specs)
    }

    fn evaluate(&self, table: &BarTable) -> Signal {
        let short = table.value_back(SHORT_MA, 0);
        let long = table.value_back(LONG_MA, 0);
        Signal::new(short > long, short < long)
    }
}
