//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest_from_port, BacktestConfig, BacktestResult, BacktestStatus};
use crate::domain::config_validation::{
    read_datetime, read_f64, read_timeframe, require_string, validate_all,
    validate_backtest_config, validate_symbol_config,
};
use crate::domain::error::TraderError;
use crate::domain::position::ClosedTrade;
use crate::domain::strategy::{self, SignalStrategy, STRATEGIES};
use crate::domain::symbol::SymbolInfo;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_CSV_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "scalptrader", about = "Indicator signal engine and bar-by-bar backtester")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over CSV bars
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the trade ledger (and equity curve) as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override `[strategy] name`
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List registered strategies
    Strategies,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            strategy,
        } => run_backtest(&config, output.as_deref(), strategy.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Strategies => run_strategies(),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &TraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_backtest(config_path: &Path, output_path: Option<&Path>, strategy_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy(&adapter, strategy_override) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    eprintln!("Strategy: {}", strategy.name());

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
    let data_port = CsvAdapter::new(PathBuf::from(csv_dir));

    eprintln!(
        "Running backtest: {} {} from {} to {}",
        bt_config.symbol, bt_config.timeframe, bt_config.start, bt_config.end
    );
    let result = match run_backtest_from_port(&data_port, strategy.as_ref(), &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if result.status == BacktestStatus::DataUnavailable {
        eprintln!(
            "error: no bars for {} {} in the requested range",
            bt_config.symbol, bt_config.timeframe
        );
        return ExitCode::from(5);
    }

    print_summary(&result);
    print_trades(&result.trades);

    if let Some(output) = output_path {
        if let Err(e) = CsvReportAdapter::new().write(&result, output) {
            return fail(&e);
        }
        eprintln!("\nLedger written to: {}", output.display());
    }

    ExitCode::SUCCESS
}

fn build_strategy(
    adapter: &dyn ConfigPort,
    strategy_override: Option<&str>,
) -> Result<Box<dyn SignalStrategy>, TraderError> {
    match strategy_override {
        Some(name) => strategy::build_named(name, adapter),
        None => strategy::build_strategy(adapter),
    }
}

/// Validated `[backtest]` and `[symbol]` sections as a run configuration.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, TraderError> {
    validate_backtest_config(adapter)?;
    validate_symbol_config(adapter)?;

    let mut config = BacktestConfig::new(
        &require_string(adapter, "backtest", "symbol")?,
        read_timeframe(adapter)?,
        read_datetime(adapter, "backtest", "start_date")?,
        read_datetime(adapter, "backtest", "end_date")?,
    );
    config.initial_equity = read_f64(
        adapter,
        "backtest",
        "initial_equity",
        BacktestConfig::DEFAULT_INITIAL_EQUITY,
    )?;
    config.lot_size = read_f64(adapter, "backtest", "lot_size", BacktestConfig::DEFAULT_LOT_SIZE)?;
    config.tp_pips = read_f64(adapter, "backtest", "tp_pips", BacktestConfig::DEFAULT_PIPS)?;
    config.sl_pips = read_f64(adapter, "backtest", "sl_pips", BacktestConfig::DEFAULT_PIPS)?;
    config.pip_value_per_lot = read_f64(
        adapter,
        "backtest",
        "pip_value_per_lot",
        BacktestConfig::DEFAULT_PIP_VALUE_PER_LOT,
    )?;
    config.symbol_info = SymbolInfo::from_config(adapter)?;
    Ok(config)
}

fn print_summary(result: &BacktestResult) {
    let summary = &result.summary;
    eprintln!("\n=== Results: {} ===", result.strategy);
    eprintln!("Bars:             {}", result.bars);
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!("Wins / Losses:    {} / {}", summary.wins, summary.losses);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Total Profit:     {:.2}", summary.total_profit);
    eprintln!("Final Equity:     {:.2}", result.final_equity);
    eprintln!("Profit Factor:    {:.2}", summary.profit_factor);
    eprintln!("Max Drawdown:     -{:.2}%", summary.max_drawdown * 100.0);
    if result.rejected_entries > 0 {
        eprintln!("Rejected Entries: {}", result.rejected_entries);
    }
    if let Some(open) = &result.open_position {
        eprintln!(
            "Open at end:      {} @ {:.5} (not counted)",
            open.side, open.entry_price
        );
    }
}

fn print_trades(trades: &[ClosedTrade]) {
    if trades.is_empty() {
        return;
    }
    eprintln!("\n=== Trades ===");
    for trade in trades {
        eprintln!("{}", trade_line(trade));
    }
}

/// `side entry @ time -> exit @ time (reason): profit`
fn trade_line(trade: &ClosedTrade) -> String {
    format!(
        "{} {:.5} @ {} -> {:.5} @ {} ({}): {:+.2}",
        trade.side,
        trade.entry_price,
        trade.entry_time.format("%Y-%m-%d %H:%M"),
        trade.exit_price,
        trade.exit_time.format("%Y-%m-%d %H:%M"),
        trade.reason,
        trade.profit
    )
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match validate_all(&adapter) {
        Ok(()) => {
            eprintln!("Config validated successfully");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_strategies() -> ExitCode {
    for entry in STRATEGIES {
        println!("{:<16} {}", entry.id, entry.description);
    }
    ExitCode::SUCCESS
}
