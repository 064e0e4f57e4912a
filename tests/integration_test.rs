//! Integration tests for the indicator/signal engine and the backtest
//! simulator, driven through the public API and a mock market data port.

mod common;

use approx::assert_relative_eq;
use common::*;
use scalptrader::domain::backtest::{run_backtest, run_backtest_from_port, BacktestStatus};
use scalptrader::domain::error::TraderError;
use scalptrader::domain::indicator::{
    calculate_ema, calculate_rsi, compute_indicators, BarTable, IndicatorSpec, IndicatorType,
};
use scalptrader::domain::position::{ExitReason, Side};
use scalptrader::domain::strategy::{
    build_named, EmaCrossover, GapConfirmation, Signal, SignalStrategy,
};
use scalptrader::domain::symbol::SymbolInfo;

/// Fires `side` whenever the snapshot has exactly one of the listed lengths.
struct Scripted {
    side: Side,
    at_len: Vec<usize>,
}

impl SignalStrategy for Scripted {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn calculate_indicators(&self, table: BarTable) -> BarTable {
        table
    }

    fn evaluate(&self, table: &BarTable) -> Signal {
        if self.at_len.contains(&table.len()) {
            Signal::from(self.side)
        } else {
            Signal::none()
        }
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn three_bar_ema_crossover() {
        let closes = [1.0000, 1.0010, 1.0020];
        let short = calculate_ema(&closes, 1);
        let long = calculate_ema(&closes, 2);

        for (s, c) in short.iter().zip(closes) {
            assert_relative_eq!(*s, c);
        }
        let k = 2.0 / 3.0;
        let mut expected = closes[0];
        assert_relative_eq!(long[0], expected);
        for i in 1..closes.len() {
            expected = closes[i] * k + expected * (1.0 - k);
            assert_relative_eq!(long[i], expected, epsilon = 1e-15);
        }

        // short crosses above long at bar 1 only
        let strategy = EmaCrossover::new(1, 2, GapConfirmation::None).unwrap();
        let bars = bars_from_closes(&closes);
        assert!(strategy.generate_signals(&bars[..1]).is_none());
        assert!(strategy.generate_signals(&bars[..2]).is_buy());
        assert!(strategy.generate_signals(&bars[..3]).is_none());
    }

    #[test]
    fn single_trade_backtest() {
        // EMA(1) crosses EMA(2) at bar 2; bar 3's high clears the 5 pip TP
        let mut bars = bars_from_closes(&[1.1000, 1.1000, 1.1010, 1.1010]);
        bars[3].high = 1.1020;
        let feed = MockMarketData::new().with_bars("EURUSD", bars);
        let strategy = EmaCrossover::new(1, 2, GapConfirmation::None).unwrap();
        let config = eurusd_config(4);

        let result = run_backtest_from_port(&feed, &strategy, &config).unwrap();

        assert_eq!(result.status, BacktestStatus::Completed);
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.side, Side::Buy);
        assert_eq!(trade.reason, ExitReason::TakeProfit);
        assert_relative_eq!(trade.entry_price, 1.1010);
        assert_relative_eq!(trade.exit_price, 1.1015, epsilon = 1e-12);
        assert_relative_eq!(trade.profit_pips, 5.0, epsilon = 1e-6);
        // 5 pips * 0.1 * 0.01 lots * 100
        assert_relative_eq!(trade.profit, 0.5, epsilon = 1e-6);
        assert_relative_eq!(result.final_equity, 1000.0 + trade.profit);
        assert_eq!(result.summary.wins, 1);
        assert!(result.open_position.is_none());
    }

    #[test]
    fn take_profit_wins_a_same_bar_tie() {
        let mut bars = bars_from_closes(&[1.1000, 1.1000, 1.1000]);
        bars[2].high = 1.1010;
        bars[2].low = 1.0990;
        let strategy = Scripted {
            side: Side::Buy,
            at_len: vec![2],
        };
        let result = run_backtest(&BarSeries::new(bars).unwrap(), &strategy, &eurusd_config(3));

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].reason, ExitReason::TakeProfit);
        assert_relative_eq!(result.trades[0].exit_price, 1.1005, epsilon = 1e-12);
        assert!(result.trades[0].profit > 0.0);
    }

    #[test]
    fn sell_stopped_out() {
        let mut bars = bars_from_closes(&[1.2000, 1.2000, 1.2000]);
        bars[2].high = 1.2008;
        let strategy = Scripted {
            side: Side::Sell,
            at_len: vec![2],
        };
        let result = run_backtest(&BarSeries::new(bars).unwrap(), &strategy, &eurusd_config(3));

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.reason, ExitReason::StopLoss);
        assert_relative_eq!(trade.exit_price, 1.2005, epsilon = 1e-12);
        assert_relative_eq!(trade.profit, -0.5, epsilon = 1e-6);
        assert_eq!(result.summary.losses, 1);
        assert_relative_eq!(result.final_equity, 999.5, epsilon = 1e-6);
    }

    #[test]
    fn position_open_at_end_is_reported_not_booked() {
        let strategy = Scripted {
            side: Side::Buy,
            at_len: vec![2],
        };
        let series = series_from_closes(&[1.1, 1.1, 1.1, 1.1]);
        let result = run_backtest(&series, &strategy, &eurusd_config(4));
        assert!(result.trades.is_empty());
        let open = result.open_position.expect("position left open");
        assert_eq!(open.side, Side::Buy);
        assert_eq!(result.final_equity, 1000.0);
    }

    #[test]
    fn equity_curve_has_one_point_per_bar() {
        let strategy = Scripted {
            side: Side::Buy,
            at_len: vec![],
        };
        let series = series_from_closes(&[1.1, 1.2, 1.3, 1.4, 1.5]);
        let result = run_backtest(&series, &strategy, &eurusd_config(5));
        assert_eq!(result.equity_curve.len(), 5);
        assert_eq!(result.equity_curve[0].time, at(0));
        assert!(result.equity_curve.iter().all(|p| p.equity == 1000.0));
    }

    #[test]
    fn unplaceable_stops_are_counted_and_skipped() {
        let strategy = Scripted {
            side: Side::Buy,
            at_len: vec![2, 3],
        };
        let mut config = eurusd_config(4);
        config.symbol_info = SymbolInfo {
            point: 0.0,
            stops_level: 0,
        };
        let result = run_backtest(&series_from_closes(&[1.1, 1.1, 1.1, 1.1]), &strategy, &config);
        assert_eq!(result.rejected_entries, 2);
        assert!(result.open_position.is_none());
        assert!(result.trades.is_empty());
    }
}

mod data_port {
    use super::*;

    #[test]
    fn missing_symbol_yields_unavailable_result() {
        let feed = MockMarketData::new();
        let strategy = EmaCrossover::new(1, 2, GapConfirmation::None).unwrap();
        let result = run_backtest_from_port(&feed, &strategy, &eurusd_config(10)).unwrap();
        assert_eq!(result.status, BacktestStatus::DataUnavailable);
        assert!(result.trades.is_empty());
        assert_eq!(result.final_equity, result.initial_equity);
        assert_eq!(result.summary.total_trades, 0);
    }

    #[test]
    fn window_outside_the_data_is_unavailable() {
        let feed = MockMarketData::new().with_bars("EURUSD", bars_from_closes(&[1.1, 1.2]));
        let strategy = EmaCrossover::new(1, 2, GapConfirmation::None).unwrap();
        let mut config = eurusd_config(2);
        config.start = at(100);
        config.end = at(200);
        let result = run_backtest_from_port(&feed, &strategy, &config).unwrap();
        assert_eq!(result.status, BacktestStatus::DataUnavailable);
    }

    #[test]
    fn feed_errors_propagate() {
        let feed = MockMarketData::new().with_error("EURUSD", "corrupt row");
        let strategy = EmaCrossover::new(1, 2, GapConfirmation::None).unwrap();
        let err = run_backtest_from_port(&feed, &strategy, &eurusd_config(10)).unwrap_err();
        assert!(matches!(err, TraderError::Data { .. }));
    }

    #[test]
    fn same_result_from_port_and_series() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 1.1 + 0.001 * ((i as f64) * 0.7).sin())
            .collect();
        let feed = MockMarketData::new().with_bars("EURUSD", bars_from_closes(&closes));
        let strategy = EmaCrossover::new(2, 5, GapConfirmation::None).unwrap();
        let config = eurusd_config(closes.len());

        let via_port = run_backtest_from_port(&feed, &strategy, &config).unwrap();
        let direct = run_backtest(&series_from_closes(&closes), &strategy, &config);
        assert_eq!(via_port, direct);
    }
}

mod indicators {
    use super::*;

    #[test]
    fn rsi_with_no_losses_is_100() {
        let closes = [1.10, 1.11, 1.12, 1.13, 1.14, 1.15];
        let rsi = calculate_rsi(&closes, 5);
        assert!(rsi[..4].iter().all(|v| v.is_nan()));
        assert_relative_eq!(rsi[4], 100.0);
        assert_relative_eq!(rsi[5], 100.0);
    }

    #[test]
    fn recomputing_columns_is_idempotent() {
        let closes: Vec<f64> = (0..40).map(|i| 1.1 + 0.0005 * (i % 7) as f64).collect();
        let specs = [
            IndicatorSpec::new(IndicatorType::Ema(5), "ema"),
            IndicatorSpec::new(IndicatorType::Sma(5), "sma"),
            IndicatorSpec::new(IndicatorType::Rsi(14), "rsi"),
            IndicatorSpec::new(IndicatorType::Adx(14), "adx"),
        ];
        let once = compute_indicators(BarTable::new(&bars_from_closes(&closes)), &specs);
        let twice = compute_indicators(once.clone(), &specs);

        assert_eq!(once.column_names(), twice.column_names());
        for name in once.column_names() {
            let a = once.column(name).unwrap();
            let b = twice.column(name).unwrap();
            for (x, y) in a.iter().zip(b) {
                assert!(x.to_bits() == y.to_bits(), "{name} changed on recompute");
            }
        }
    }
}

mod registry {
    use super::*;
    use scalptrader::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn every_registered_strategy_runs_a_backtest() {
        let config = FileConfigAdapter::from_string("[strategy]\nrsi_period = 5\n").unwrap();
        let closes: Vec<f64> = (0..80)
            .map(|i| 1.1 + 0.002 * ((i as f64) * 0.3).sin())
            .collect();
        let series = series_from_closes(&closes);
        for id in scalptrader::domain::strategy::available() {
            let strategy = build_named(id, &config).unwrap();
            let result = run_backtest(&series, strategy.as_ref(), &eurusd_config(closes.len()));
            assert_eq!(result.status, BacktestStatus::Completed, "{id}");
            assert_eq!(result.equity_curve.len(), closes.len(), "{id}");
            let booked: f64 = result.trades.iter().map(|t| t.profit).sum();
            assert_relative_eq!(result.final_equity, 1000.0 + booked, epsilon = 1e-9);
        }
    }
}
