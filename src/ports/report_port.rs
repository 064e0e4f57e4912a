//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TraderError;
use std::path::Path;

/// Port for writing a finished backtest somewhere durable.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), TraderError>;
}
