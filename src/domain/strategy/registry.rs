//! Static strategy registry, resolved once at startup from `[strategy] name`.

use crate::domain::error::TraderError;
use crate::domain::strategy::{
    EmaCrossover, MovingAverage, RsiAdx, ScalpingEmaRsi, SignalStrategy,
};
use crate::ports::config_port::ConfigPort;

pub type StrategyBuilder = fn(&dyn ConfigPort) -> Result<Box<dyn SignalStrategy>, TraderError>;

pub struct StrategyEntry {
    pub id: &'static str,
    pub description: &'static str,
    pub build: StrategyBuilder,
}

pub const DEFAULT_STRATEGY: &str = "ema_crossover";

pub static STRATEGIES: &[StrategyEntry] = &[
    StrategyEntry {
        id: "ema_crossover",
        description: "EMA crossover with widening gap and optional gap confirmation",
        build: |config| Ok(Box::new(EmaCrossover::from_config(config)?)),
    },
    StrategyEntry {
        id: "moving_average",
        description: "short MA above/below long MA, every bar",
        build: |config| Ok(Box::new(MovingAverage::from_config(config)?)),
    },
    StrategyEntry {
        id: "rsi_adx",
        description: "RSI overbought/oversold while ADX shows a trend",
        build: |config| Ok(Box::new(RsiAdx::from_config(config)?)),
    },
    StrategyEntry {
        id: "scalping_ema",
        description: "EMA crossover inside an RSI band, ADX off/gate/advisory",
        build: |config| Ok(Box::new(ScalpingEmaRsi::from_config(config)?)),
    },
];

pub fn available() -> Vec<&'static str> {
    STRATEGIES.iter().map(|e| e.id).collect()
}

pub fn lookup(id: &str) -> Result<&'static StrategyEntry, TraderError> {
    let wanted = id.trim().to_lowercase();
    STRATEGIES
        .iter()
        .find(|e| e.id == wanted)
        .ok_or_else(|| TraderError::UnknownStrategy {
            name: id.to_string(),
            available: available().join(", "),
        })
}

/// Build the strategy named by `[strategy] name` (default `ema_crossover`).
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Box<dyn SignalStrategy>, TraderError> {
    let id = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string());
    build_named(&id, config)
}

/// Build `id`, reading its parameters from `config`.
pub fn build_named(
    id: &str,
    config: &dyn ConfigPort,
) -> Result<Box<dyn SignalStrategy>, TraderError> {
    (lookup(id)?.build)(config)
}
