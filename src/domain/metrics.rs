//! Performance summary over a finished run's trade ledger.

use super::ledger::EquityPoint;
use super::position::ClosedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub total_profit: f64,
    pub final_equity: f64,
    /// Fraction of trades with positive profit, 0 when there are none.
    pub win_rate: f64,
    pub wins: usize,
    /// Trades with zero or negative profit.
    pub losses: usize,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Largest peak-to-trough fall of the equity curve, as a fraction.
    pub max_drawdown: f64,
}

impl PerformanceSummary {
    pub fn compute(
        trades: &[ClosedTrade],
        equity_curve: &[EquityPoint],
        final_equity: f64,
    ) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for trade in trades {
            let profit = trade.profit;
            if trade.is_win() {
                wins += 1;
                total_wins += profit;
                largest_win = largest_win.max(profit);
            } else {
                losses += 1;
                total_losses += profit.abs();
                largest_loss = largest_loss.max(profit.abs());
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if wins > 0 {
            total_wins / wins as f64
        } else {
            0.0
        };
        let avg_loss = if losses > 0 {
            total_losses / losses as f64
        } else {
            0.0
        };

        PerformanceSummary {
            total_trades,
            total_profit: trades.iter().map(|t| t.profit).sum(),
            final_equity,
            win_rate,
            wins,
            losses,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown: compute_drawdown(equity_curve),
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }
    max_dd
}
