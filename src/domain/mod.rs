//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ledger;
pub mod live;
pub mod metrics;
pub mod ohlcv;
pub mod order;
pub mod position;
pub mod strategy;
pub mod symbol;
