//! CSV backtest report: the trade ledger at the requested path, the equity
//! curve next to it as `<stem>_equity.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TraderError;
use crate::ports::report_port::ReportPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn equity_path(output_path: &Path) -> PathBuf {
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        output_path.with_file_name(format!("{stem}_equity.csv"))
    }

    fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), TraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record([
            "entry_time",
            "exit_time",
            "side",
            "entry_price",
            "exit_price",
            "take_profit",
            "stop_loss",
            "profit_pips",
            "profit",
            "reason",
        ])
        .map_err(csv_error)?;

        for trade in &result.trades {
            wtr.write_record([
                trade.entry_time.format(TIME_FORMAT).to_string(),
                trade.exit_time.format(TIME_FORMAT).to_string(),
                trade.side.to_string(),
                format!("{:.5}", trade.entry_price),
                format!("{:.5}", trade.exit_price),
                format!("{:.5}", trade.take_profit),
                format!("{:.5}", trade.stop_loss),
                format!("{:.1}", trade.profit_pips),
                format!("{:.2}", trade.profit),
                trade.reason.to_string(),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_equity(result: &BacktestResult, path: &Path) -> Result<(), TraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record(["time", "equity"]).map_err(csv_error)?;
        for point in &result.equity_curve {
            wtr.write_record([
                point.time.format(TIME_FORMAT).to_string(),
                format!("{:.2}", point.equity),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_error(e: csv::Error) -> TraderError {
    TraderError::Data {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TraderError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let equity_path = Self::equity_path(output_path);
        Self::write_trades(result, output_path)?;
        Self::write_equity(result, &equity_path)?;
        info!(
            trades = %output_path.display(),
            equity = %equity_path.display(),
            "report written"
        );
        Ok(())
    }
}
