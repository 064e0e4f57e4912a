//! Trade ledger and running equity for a single backtest run.

use chrono::NaiveDateTime;

use super::position::ClosedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub equity: f64,
}

/// Append-only record of closed trades. Equity moves only when a trade is
/// recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_equity: f64,
    equity: f64,
    trades: Vec<ClosedTrade>,
    equity_curve: Vec<EquityPoint>,
}

impl Ledger {
    pub fn new(initial_equity: f64) -> Self {
        Ledger {
            initial_equity,
            equity: initial_equity,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn initial_equity(&self) -> f64 {
        self.initial_equity
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.equity += trade.profit;
        self.trades.push(trade);
    }

    pub fn mark(&mut self, time: NaiveDateTime) {
        self.equity_curve.push(EquityPoint {
            time,
            equity: self.equity,
        });
    }

    pub fn into_parts(self) -> (Vec<ClosedTrade>, f64, Vec<EquityPoint>) {
        (self.trades, self.equity, self.equity_curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{ExitReason, Side};
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn trade(profit: f64) -> ClosedTrade {
        ClosedTrade {
            side: Side::Buy,
            entry_price: 1.1,
            exit_price: 1.1005,
            entry_time: at(0),
            exit_time: at(3),
            take_profit: 1.1005,
            stop_loss: 1.0995,
            profit_pips: 5.0,
            profit,
            reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn new_ledger_is_flat() {
        let ledger = Ledger::new(1000.0);
        assert_eq!(ledger.equity(), 1000.0);
        assert!(ledger.trades().is_empty());
        assert!(ledger.equity_curve().is_empty());
    }

    #[test]
    fn recording_moves_equity_once_per_trade() {
        let mut ledger = Ledger::new(1000.0);
        ledger.record_trade(trade(0.5));
        ledger.record_trade(trade(-0.25));
        assert!((ledger.equity() - 1000.25).abs() < 1e-12);
        assert_eq!(ledger.trades().len(), 2);
        assert_eq!(ledger.initial_equity(), 1000.0);
    }

    #[test]
    fn marks_snapshot_current_equity() {
        let mut ledger = Ledger::new(1000.0);
        ledger.mark(at(1));
        ledger.record_trade(trade(2.0));
        ledger.mark(at(2));
        let curve = ledger.equity_curve();
        assert_eq!(curve[0].equity, 1000.0);
        assert_eq!(curve[1].equity, 1002.0);
        assert_eq!(curve[1].time, at(2));
    }
}
