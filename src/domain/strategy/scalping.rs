//! Scalping EMA crossover gated by an RSI band, with an optional ADX check.
//!
//! Buys need RSI below `rsi_upper`, sells need RSI above `rsi_lower`; an
//! undefined RSI rejects both. `AdxPolicy` decides what ADX does:
//! - `Off`: not computed.
//! - `Gate`: a signal survives only when ADX exceeds the threshold.
//! - `Advisory`: the signal is kept and labelled strong or weak.

use crate::domain::config_validation::{read_f64, read_period};
use crate::domain::error::TraderError;
use crate::domain::indicator::{compute_indicators, BarTable, IndicatorSpec, IndicatorType};
use crate::domain::strategy::ema_crossover::{validate_periods, EMA_GAP, LONG_EMA, SHORT_EMA};
use crate::domain::strategy::{crossover, Signal, SignalStrategy};
use crate::ports::config_port::ConfigPort;
use tracing::{debug, info};

pub const RSI: &str = "rsi";
pub const ADX: &str = "adx";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdxPolicy {
    Off,
    Gate { period: usize, threshold: f64 },
    Advisory { period: usize, threshold: f64 },
}

impl AdxPolicy {
    fn period(&self) -> Option<usize> {
        match self {
            AdxPolicy::Off => None,
            AdxPolicy::Gate { period, .. } | AdxPolicy::Advisory { period, .. } => Some(*period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStrength {
    Strong,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalpingAssessment {
    pub signal: Signal,
    /// Set only under `AdxPolicy::Advisory` when a signal fired.
    pub strength: Option<TrendStrength>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalpingEmaRsi {
    pub short_period: usize,
    pub long_period: usize,
    pub rsi_period: usize,
    pub rsi_upper: f64,
    pub rsi_lower: f64,
    pub adx: AdxPolicy,
}

impl Default for ScalpingEmaRsi {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 7,
            rsi_period: 14,
            rsi_upper: 70.0,
            rsi_lower: 30.0,
            adx: AdxPolicy::Off,
        }
    }
}

impl ScalpingEmaRsi {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let d = Self::default();
        let short_period = read_period(config, "strategy", "short_period", d.short_period)?;
        let long_period = read_period(config, "strategy", "long_period", d.long_period)?;
        validate_periods(short_period, long_period)?;

        let period = read_period(config, "strategy", "adx_period", 14)?;
        let threshold = read_f64(config, "strategy", "adx_threshold", 25.0)?;
        let raw = config
            .get_string("strategy", "adx_policy")
            .unwrap_or_else(|| "off".to_string());
        let adx = match raw.trim().to_lowercase().as_str() {
            "off" | "none" => AdxPolicy::Off,
            "gate" => AdxPolicy::Gate { period, threshold },
            "advisory" => AdxPolicy::Advisory { period, threshold },
            _ => {
                return Err(TraderError::ConfigInvalid {
                    section: "strategy".into(),
                    key: "adx_policy".into(),
                    reason: format!("expected off, gate or advisory, got '{raw}'"),
                });
            }
        };

        let rsi_upper = read_f64(config, "strategy", "rsi_upper", d.rsi_upper)?;
        let rsi_lower = read_f64(config, "strategy", "rsi_lower", d.rsi_lower)?;
        if rsi_lower >= rsi_upper {
            return Err(TraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "rsi_lower".into(),
                reason: "rsi_lower must be below rsi_upper".into(),
            });
        }

        Ok(Self {
            short_period,
            long_period,
            rsi_period: read_period(config, "strategy", "rsi_period", d.rsi_period)?,
            rsi_upper,
            rsi_lower,
            adx,
        })
    }

    /// Signal plus the advisory trend label for the table's last row.
    pub fn assess(&self, table: &BarTable) -> ScalpingAssessment {
        let cross = crossover(table, SHORT_EMA, LONG_EMA);
        let rsi = table.value_back(RSI, 0);
        let signal = Signal::new(
            cross.is_buy() && rsi < self.rsi_upper,
            cross.is_sell() && rsi > self.rsi_lower,
        );
        if signal.is_none() {
            if !cross.is_none() {
                debug!(rsi, "crossover rejected by rsi band");
            }
            return ScalpingAssessment {
                signal,
                strength: None,
            };
        }

        let adx = table.value_back(ADX, 0);
        match self.adx {
            AdxPolicy::Off => ScalpingAssessment {
                signal,
                strength: None,
            },
            AdxPolicy::Gate { threshold, .. } => {
                if adx > threshold {
                    ScalpingAssessment {
                        signal,
                        strength: None,
                    }
                } else {
                    debug!(adx, threshold, "signal dropped by adx gate");
                    ScalpingAssessment {
                        signal: Signal::none(),
                        strength: None,
                    }
                }
            }
            AdxPolicy::Advisory { threshold, .. } => {
                let strength = if adx > threshold {
                    TrendStrength::Strong
                } else {
                    TrendStrength::Weak
                };
                info!(?signal, adx, ?strength, "scalping signal");
                ScalpingAssessment {
                    signal,
                    strength: Some(strength),
                }
            }
        }
    }
}

impl SignalStrategy for ScalpingEmaRsi {
    fn name(&self) -> &str {
        "ScalpingEmaRsi"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn calculate_indicators(&self, table: BarTable) -> BarTable {
        let mut specs = vec![
            IndicatorSpec::new(IndicatorType::Ema(self.short_period), SHORT_EMA),
            IndicatorSpec::new(IndicatorType::Ema(self.long_period), LONG_EMA),
            IndicatorSpec::new(IndicatorType::Rsi(self.rsi_period), RSI),
        ];
        if let Some(period) = self.adx.period() {
            specs.push(IndicatorSpec::new(IndicatorType::Adx(period), ADX));
        }
        let table = compute_indicators(table, &specs);
        let gap = table.difference(SHORT_EMA, LONG_EMA);
        table.with_column(EMA_GAP, gap)
    }

    fn evaluate(&self, table: &BarTable) -> Signal {
        self.assess(table).signal
    }
}
