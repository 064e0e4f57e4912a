//! Signal strategies.
//!
//! Every variant implements [`SignalStrategy`]: it enriches a [`BarTable`]
//! with the columns it needs and reduces the last rows of that table to a
//! [`Signal`]. Strategies carry only immutable parameters, so one instance
//! can be evaluated against any number of bar slices.

pub mod ema_crossover;
pub mod moving_average;
pub mod registry;
pub mod rsi_adx;
pub mod scalping;

pub use ema_crossover::{EmaCrossover, GapConfirmation};
pub use moving_average::{MaKind, MovingAverage};
pub use registry::{available, build_named, build_strategy, StrategyEntry, STRATEGIES};
pub use rsi_adx::RsiAdx;
pub use scalping::{AdxPolicy, ScalpingAssessment, ScalpingEmaRsi, TrendStrength};

use crate::domain::error::TraderError;
use crate::domain::indicator::BarTable;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::Side;
use tracing::{debug, warn};

/// Buy/sell decision for the last bar of a snapshot. Both flags are never
/// set at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signal {
    buy: bool,
    sell: bool,
}

impl Signal {
    /// Build from raw conditions. Conflicting conditions resolve to no action.
    pub fn new(buy: bool, sell: bool) -> Self {
        if buy && sell {
            warn!("buy and sell conditions both hold, taking no action");
            return Signal::none();
        }
        Signal { buy, sell }
    }

    pub fn none() -> Self {
        Signal::default()
    }

    pub fn buy() -> Self {
        Signal {
            buy: true,
            sell: false,
        }
    }

    pub fn sell() -> Self {
        Signal {
            buy: false,
            sell: true,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.buy
    }

    pub fn is_sell(&self) -> bool {
        self.sell
    }

    pub fn is_none(&self) -> bool {
        !self.buy && !self.sell
    }

    pub fn side(&self) -> Option<Side> {
        match (self.buy, self.sell) {
            (true, _) => Some(Side::Buy),
            (_, true) => Some(Side::Sell),
            _ => None,
        }
    }
}

impl From<Side> for Signal {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Signal::buy(),
            Side::Sell => Signal::sell(),
        }
    }
}

pub trait SignalStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Rows needed before `evaluate` is meaningful.
    fn min_bars(&self) -> usize;

    fn calculate_indicators(&self, table: BarTable) -> BarTable;

    /// Reduce an enriched table to a signal for its last row.
    fn evaluate(&self, table: &BarTable) -> Signal;

    /// Like [`generate_signals`](Self::generate_signals), but a snapshot
    /// shorter than `min_bars` is an `InsufficientHistory` error.
    fn try_generate_signals(&self, bars: &[OhlcvBar]) -> Result<Signal, TraderError> {
        if bars.len() < self.min_bars() {
            return Err(TraderError::InsufficientHistory {
                bars: bars.len(),
                minimum: self.min_bars(),
            });
        }
        let table = self.calculate_indicators(BarTable::new(bars));
        Ok(self.evaluate(&table))
    }

    /// Signal for the last bar; no action while history is too short.
    fn generate_signals(&self, bars: &[OhlcvBar]) -> Signal {
        self.try_generate_signals(bars).unwrap_or_else(|e| {
            debug!(strategy = self.name(), error = %e, "not enough bars to evaluate");
            Signal::none()
        })
    }
}

/// Crossing test over the last two rows of `short` against `long`.
///
/// Upward: short above long now, at or below it one row earlier, gap
/// widening. Downward mirrors it. NaN anywhere fails both.
pub(crate) fn crossover(table: &BarTable, short: &str, long: &str) -> Signal {
    let (short_now, short_prev) = (table.value_back(short, 0), table.value_back(short, 1));
    let (long_now, long_prev) = (table.value_back(long, 0), table.value_back(long, 1));
    let gap_now = short_now - long_now;
    let gap_prev = short_prev - long_prev;

    let up = short_now > long_now && short_prev <= long_prev && gap_now > gap_prev;
    let down = short_now < long_now && short_prev >= long_prev && gap_now < gap_prev;
    Signal::new(up, down)
}
