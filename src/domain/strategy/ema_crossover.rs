//! EMA crossover with optional gap confirmation.
//!
//! Base rule: short EMA crosses the long EMA and the gap between them widens
//! in the direction of the cross. `GapConfirmation` adds one extra check on
//! top of that:
//! - `Trend`: the rolling mean of the gap over `window` bars has the
//!   signal's sign (undefined until `window` bars exist).
//! - `Accelerating`: `Trend`, plus the last bar's gap change is strictly
//!   beyond the change one bar earlier in the signal's direction.

use crate::domain::config_validation::{read_period, read_usize};
use crate::domain::error::TraderError;
use crate::domain::indicator::{
    calculate_sma, compute_indicators, BarTable, IndicatorSpec, IndicatorType,
};
use crate::domain::strategy::{crossover, Signal, SignalStrategy};
use crate::ports::config_port::ConfigPort;
use tracing::debug;

pub const SHORT_EMA: &str = "short_ema";
pub const LONG_EMA: &str = "long_ema";
pub const EMA_GAP: &str = "ema_gap";
pub const EMA_GAP_TREND: &str = "ema_gap_trend";

pub const DEFAULT_GAP_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapConfirmation {
    None,
    Trend { window: usize },
    Accelerating { window: usize },
}

impl GapConfirmation {
    pub fn parse(value: &str, window: usize) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" | "off" => Some(GapConfirmation::None),
            "trend" => Some(GapConfirmation::Trend { window }),
            "accelerating" => Some(GapConfirmation::Accelerating { window }),
            _ => None,
        }
    }

    pub fn window(&self) -> Option<usize> {
        match self {
            GapConfirmation::None => None,
            GapConfirmation::Trend { window } | GapConfirmation::Accelerating { window } => {
                Some(*window)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossover {
    short_period: usize,
    long_period: usize,
    confirmation: GapConfirmation,
}

impl EmaCrossover {
    pub fn new(
        short_period: usize,
        long_period: usize,
        confirmation: GapConfirmation,
    ) -> Result<Self, TraderError> {
        validate_periods(short_period, long_period)?;
        if confirmation.window() == Some(0) {
            return Err(TraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "gap_window".into(),
                reason: "gap_window must be at least 1".into(),
            });
        }
        Ok(Self {
            short_period,
            long_period,
            confirmation,
        })
    }

    /// Reads `short_period` (5), `long_period` (7), `confirmation` (trend)
    /// and `gap_window` (5) from `[strategy]`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let short = read_period(config, "strategy", "short_period", 5)?;
        let long = read_period(config, "strategy", "long_period", 7)?;
        let window = read_usize(config, "strategy", "gap_window", DEFAULT_GAP_WINDOW)?;
        let raw = config
            .get_string("strategy", "confirmation")
            .unwrap_or_else(|| "trend".to_string());
        let confirmation =
            GapConfirmation::parse(&raw, window).ok_or_else(|| TraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "confirmation".into(),
                reason: format!("expected none, trend or accelerating, got '{raw}'"),
            })?;
        Self::new(short, long, confirmation)
    }

    pub fn confirmation(&self) -> GapConfirmation {
        self.confirmation
    }

    fn trend_confirms(&self, table: &BarTable, signal: Signal) -> bool {
        let trend = table.value_back(EMA_GAP_TREND, 0);
        (signal.is_buy() && trend > 0.0) || (signal.is_sell() && trend < 0.0)
    }

    fn accelerating(&self, table: &BarTable, signal: Signal) -> bool {
        let change_now = table.value_back(EMA_GAP, 0) - table.value_back(EMA_GAP, 1);
        let change_prev = table.value_back(EMA_GAP, 1) - table.value_back(EMA_GAP, 2);
        (signal.is_buy() && change_now > change_prev)
            || (signal.is_sell() && change_now < change_prev)
    }
}

pub(crate) fn validate_periods(short: usize, long: usize) -> Result<(), TraderError> {
    if short == 0 || long == 0 {
        return Err(TraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "short_period".into(),
            reason: "periods must be at least 1".into(),
        });
    }
    if short >= long {
        return Err(TraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "short_period".into(),
            reason: format!("short_period ({short}) must be less than long_period ({long})"),
        });
    }
    Ok(())
}

impl SignalStrategy for EmaCrossover {
    fn name(&self) -> &str {
        "EmaCrossover"
    }

    fn min_bars(&self) -> usize {
        match self.confirmation {
            GapConfirmation::Accelerating { .. } => 3,
            _ => 2,
        }
    }

    fn calculate_indicators(&self, table: BarTable) -> BarTable {
        let specs = [
            IndicatorSpec::new(IndicatorType::Ema(self.short_period), SHORT_EMA),
            IndicatorSpec::new(IndicatorType::Ema(self.long_period), LONG_EMA),
        ];
        let table = compute_indicators(table, &specs);
        let gap = table.difference(SHORT_EMA, LONG_EMA);
        let table = match self.confirmation.window() {
            Some(window) => {
                let trend = calculate_sma(&gap, window);
                table.with_column(EMA_GAP, gap).with_column(EMA_GAP_TREND, trend)
            }
            None => table.with_column(EMA_GAP, gap),
        };
        debug!(
            short_ema = table.value_back(SHORT_EMA, 0),
            long_ema = table.value_back(LONG_EMA, 0),
            ema_gap = table.value_back(EMA_GAP, 0),
            "ema crossover indicators"
        );
        table
    }

    fn evaluate(&self, table: &BarTable) -> Signal {
        let signal = crossover(table, SHORT_EMA, LONG_EMA);
        if signal.is_none() {
            return signal;
        }
        let confirmed = match self.confirmation {
            GapConfirmation::None => true,
            GapConfirmation::Trend { .. } => self.trend_confirms(table, signal),
            GapConfirmation::Accelerating { .. } => {
                self.trend_confirms(table, signal) && self.accelerating(table, signal)
            }
        };
        if confirmed {
            signal
        } else {
            debug!(?signal, confirmation = ?self.confirmation, "crossover not confirmed");
            Signal::none()
        }
    }
}
