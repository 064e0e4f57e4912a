//! Simulated position tracking and closed trades.

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => f.write_str("take_profit"),
            ExitReason::StopLoss => f.write_str("stop_loss"),
        }
    }
}

/// An open simulated position. Only the backtest simulator creates and
/// resolves these.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl Position {
    pub fn touches_take_profit(&self, bar: &OhlcvBar) -> bool {
        match self.side {
            Side::Buy => bar.high >= self.take_profit,
            Side::Sell => bar.low <= self.take_profit,
        }
    }

    pub fn touches_stop_loss(&self, bar: &OhlcvBar) -> bool {
        match self.side {
            Side::Buy => bar.low <= self.stop_loss,
            Side::Sell => bar.high >= self.stop_loss,
        }
    }

    /// Exit price and reason if `bar` reaches either bound. Take-profit is
    /// checked first, so a bar spanning both bounds exits at the TP price.
    pub fn exit_on(&self, bar: &OhlcvBar) -> Option<(f64, ExitReason)> {
        if self.touches_take_profit(bar) {
            Some((self.take_profit, ExitReason::TakeProfit))
        } else if self.touches_stop_loss(bar) {
            Some((self.stop_loss, ExitReason::StopLoss))
        } else {
            None
        }
    }

    /// Signed price move in pips from entry to `exit_price`.
    pub fn profit_pips(&self, exit_price: f64, pip_size: f64) -> f64 {
        self.side.sign() * (exit_price - self.entry_price) / pip_size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub profit_pips: f64,
    pub profit: f64,
    pub reason: ExitReason,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}
