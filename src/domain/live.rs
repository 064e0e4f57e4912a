//! Polling live driver.
//!
//! Each tick: skip while the venue holds a position, otherwise fetch the
//! latest bars, evaluate the strategy and send an order on a signal. Too
//! few bars is a retryable tick error. The stop flag is read between
//! ticks, never during one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::config_validation::{read_period, read_usize};
use crate::domain::error::TraderError;
use crate::domain::ohlcv::Timeframe;
use crate::domain::order::{OrderManager, Ticket};
use crate::domain::strategy::SignalStrategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::execution_port::ExecutionPort;

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    PositionOpen,
    DataUnavailable,
    NoSignal,
    OrderPlaced(Ticket),
    OrderFailed(String),
}

impl TickOutcome {
    fn attempted_order(&self) -> bool {
        matches!(self, TickOutcome::OrderPlaced(_) | TickOutcome::OrderFailed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: usize,
    pub check_interval: Duration,
    pub sleep_after_trade: Duration,
}

impl LiveSettings {
    pub fn from_config(
        config: &dyn ConfigPort,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Self, TraderError> {
        Ok(Self {
            symbol: symbol.to_string(),
            timeframe,
            bars: read_period(config, "live", "bars", 100)?,
            check_interval: Duration::from_secs(
                read_usize(config, "live", "check_interval_secs", 30)? as u64,
            ),
            sleep_after_trade: Duration::from_secs(
                read_usize(config, "live", "sleep_after_trade_secs", 60)? as u64,
            ),
        })
    }
}

pub struct LiveDriver<'a> {
    data: &'a dyn MarketDataPort,
    venue: &'a dyn ExecutionPort,
    strategy: &'a dyn SignalStrategy,
    orders: OrderManager,
    settings: LiveSettings,
}

impl<'a> LiveDriver<'a> {
    pub fn new(
        data: &'a dyn MarketDataPort,
        venue: &'a dyn ExecutionPort,
        strategy: &'a dyn SignalStrategy,
        orders: OrderManager,
        settings: LiveSettings,
    ) -> Self {
        Self {
            data,
            venue,
            strategy,
            orders,
            settings,
        }
    }

    pub fn tick(&self) -> Result<TickOutcome, TraderError> {
        let symbol = &self.settings.symbol;
        let open = self.venue.open_positions(symbol)?;
        if open > 0 {
            debug!(%symbol, open, "position open, waiting");
            return Ok(TickOutcome::PositionOpen);
        }

        let series = match self
            .data
            .fetch_latest(symbol, self.settings.timeframe, self.settings.bars)
        {
            Ok(series) if !series.is_empty() => series,
            Ok(_) | Err(TraderError::DataUnavailable { .. }) => {
                warn!(%symbol, "no bars from feed");
                return Ok(TickOutcome::DataUnavailable);
            }
            Err(e) => return Err(e),
        };

        let Some(side) = self.strategy.try_generate_signals(series.bars())?.side() else {
            debug!(%symbol, strategy = self.strategy.name(), "no signal");
            return Ok(TickOutcome::NoSignal);
        };

        info!(%symbol, %side, "signal detected");
        match self.orders.place(side, self.venue) {
            Ok(ticket) => Ok(TickOutcome::OrderPlaced(ticket)),
            Err(e @ (TraderError::Order { .. } | TraderError::InvalidStopConfiguration { .. })) => {
                Ok(TickOutcome::OrderFailed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Tick until `stop` is set. Retryable errors are logged and waited
    /// out; anything else ends the loop. Returns the number of ticks run.
    pub fn run(&self, stop: &AtomicBool, sleeper: &dyn Sleeper) -> Result<usize, TraderError> {
        info!(
            symbol = %self.settings.symbol,
            strategy = self.strategy.name(),
            "live driver started"
        );
        let mut ticks = 0usize;
        while !stop.load(Ordering::SeqCst) {
            let pause = match self.tick() {
                Ok(outcome) if outcome.attempted_order() => self.settings.sleep_after_trade,
                Ok(_) => self.settings.check_interval,
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "tick failed, retrying");
                    self.settings.check_interval
                }
                Err(e) => return Err(e),
            };
            ticks += 1;
            sleeper.sleep(pause);
        }
        info!(ticks, "live driver stopped");
        Ok(ticks)
    }
}
