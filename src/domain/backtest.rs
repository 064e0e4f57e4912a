//! Bar-by-bar backtest simulator.
//!
//! One position at a time. For each bar after the first: an open position
//! is checked against the bar's high/low (TP before SL), then, if flat, the
//! strategy is asked about the bars up to and including this one. Entries
//! fill at the bar's close.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::error::TraderError;
use crate::domain::ledger::{EquityPoint, Ledger};
use crate::domain::metrics::PerformanceSummary;
use crate::domain::ohlcv::{BarSeries, OhlcvBar, Timeframe};
use crate::domain::position::{ClosedTrade, ExitReason, Position};
use crate::domain::strategy::SignalStrategy;
use crate::domain::symbol::{compute_stop_levels, SymbolInfo};
use crate::ports::data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub initial_equity: f64,
    pub lot_size: f64,
    pub tp_pips: f64,
    pub sl_pips: f64,
    /// Account currency per pip for one standard lot, divided by 100.
    pub pip_value_per_lot: f64,
    pub symbol_info: SymbolInfo,
}

impl BacktestConfig {
    pub const DEFAULT_INITIAL_EQUITY: f64 = 1000.0;
    pub const DEFAULT_LOT_SIZE: f64 = 0.01;
    pub const DEFAULT_PIPS: f64 = 5.0;
    pub const DEFAULT_PIP_VALUE_PER_LOT: f64 = 0.1;

    pub fn new(symbol: &str, timeframe: Timeframe, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            start,
            end,
            initial_equity: Self::DEFAULT_INITIAL_EQUITY,
            lot_size: Self::DEFAULT_LOT_SIZE,
            tp_pips: Self::DEFAULT_PIPS,
            sl_pips: Self::DEFAULT_PIPS,
            pip_value_per_lot: Self::DEFAULT_PIP_VALUE_PER_LOT,
            symbol_info: SymbolInfo::default(),
        }
    }

    /// Account-currency profit for a move of `profit_pips`.
    pub fn profit(&self, profit_pips: f64) -> f64 {
        profit_pips * self.pip_value_per_lot * self.lot_size * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktestStatus {
    Completed,
    DataUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: String,
    pub status: BacktestStatus,
    pub trades: Vec<ClosedTrade>,
    pub initial_equity: f64,
    pub final_equity: f64,
    /// One point per bar; bar 0 carries the starting balance.
    pub equity_curve: Vec<EquityPoint>,
    /// Still open when the bars ran out. Never counted in equity.
    pub open_position: Option<Position>,
    /// Signals dropped because TP/SL could not be placed.
    pub rejected_entries: usize,
    pub bars: usize,
    pub summary: PerformanceSummary,
}

impl BacktestResult {
    fn unavailable(strategy: &dyn SignalStrategy, config: &BacktestConfig) -> Self {
        BacktestResult {
            strategy: strategy.name().to_string(),
            status: BacktestStatus::DataUnavailable,
            trades: Vec::new(),
            initial_equity: config.initial_equity,
            final_equity: config.initial_equity,
            equity_curve: Vec::new(),
            open_position: None,
            rejected_entries: 0,
            bars: 0,
            summary: PerformanceSummary::compute(&[], &[], config.initial_equity),
        }
    }
}

pub fn run_backtest(
    series: &BarSeries,
    strategy: &dyn SignalStrategy,
    config: &BacktestConfig,
) -> BacktestResult {
    let bars = series.bars();
    let Some(first) = bars.first() else {
        warn!(symbol = %config.symbol, "empty bar series, nothing to simulate");
        return BacktestResult::unavailable(strategy, config);
    };

    info!(
        strategy = strategy.name(),
        symbol = %config.symbol,
        timeframe = %config.timeframe,
        bars = bars.len(),
        "starting backtest"
    );

    let mut ledger = Ledger::new(config.initial_equity);
    ledger.mark(first.time);
    let mut position: Option<Position> = None;
    let mut rejected_entries = 0usize;

    for (i, bar) in bars.iter().enumerate().skip(1) {
        if let Some(open) = position.take() {
            match open.exit_on(bar) {
                Some((exit_price, reason)) => {
                    let trade = close_position(open, exit_price, reason, bar, config);
                    info!(
                        side = %trade.side,
                        entry = trade.entry_price,
                        exit = trade.exit_price,
                        reason = %trade.reason,
                        profit = trade.profit,
                        "position closed"
                    );
                    ledger.record_trade(trade);
                }
                None => position = Some(open),
            }
        }

        if position.is_none() {
            let signal = strategy.generate_signals(series.slice_to(i));
            if let Some(side) = signal.side() {
                match compute_stop_levels(
                    side,
                    bar.close,
                    config.tp_pips,
                    config.sl_pips,
                    &config.symbol_info,
                ) {
                    Ok(levels) => {
                        debug!(
                            %side,
                            price = bar.close,
                            tp = levels.take_profit,
                            sl = levels.stop_loss,
                            time = %bar.time,
                            "position opened"
                        );
                        position = Some(Position {
                            side,
                            entry_price: bar.close,
                            entry_time: bar.time,
                            take_profit: levels.take_profit,
                            stop_loss: levels.stop_loss,
                        });
                    }
                    Err(e) => {
                        warn!(%side, time = %bar.time, error = %e, "entry rejected");
                        rejected_entries += 1;
                    }
                }
            }
        }

        ledger.mark(bar.time);
    }

    if let Some(open) = &position {
        info!(side = %open.side, entry = open.entry_price, "position still open at end of data");
    }

    let (trades, final_equity, equity_curve) = ledger.into_parts();
    let summary = PerformanceSummary::compute(&trades, &equity_curve, final_equity);
    info!(
        trades = summary.total_trades,
        profit = summary.total_profit,
        final_equity,
        "backtest finished"
    );

    BacktestResult {
        strategy: strategy.name().to_string(),
        status: BacktestStatus::Completed,
        trades,
        initial_equity: config.initial_equity,
        final_equity,
        equity_curve,
        open_position: position,
        rejected_entries,
        bars: bars.len(),
        summary,
    }
}

/// Fetch `[start, end]` from `port` and run. A feed with no data yields a
/// `DataUnavailable` result rather than an error.
pub fn run_backtest_from_port(
    port: &dyn MarketDataPort,
    strategy: &dyn SignalStrategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, TraderError> {
    match port.fetch_range(&config.symbol, config.timeframe, config.start, config.end) {
        Ok(series) => Ok(run_backtest(
            &series.within(config.start, config.end),
            strategy,
            config,
        )),
        Err(e @ TraderError::DataUnavailable { .. }) => {
            warn!(error = %e, "no historical data");
            Ok(BacktestResult::unavailable(strategy, config))
        }
        Err(e) => Err(e),
    }
}

fn close_position(
    position: Position,
    exit_price: f64,
    reason: ExitReason,
    bar: &OhlcvBar,
    config: &BacktestConfig,
) -> ClosedTrade {
    let profit_pips = position.profit_pips(exit_price, config.symbol_info.pip_size());
    ClosedTrade {
        side: position.side,
        entry_price: position.entry_price,
        exit_price,
        entry_time: position.entry_time,
        exit_time: bar.time,
        take_profit: position.take_profit,
        stop_loss: position.stop_loss,
        profit_pips,
        profit: config.profit(profit_pips),
        reason,
    }
}
