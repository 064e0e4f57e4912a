//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for scalptrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("no market data for {symbol} ({timeframe})")]
    DataUnavailable { symbol: String, timeframe: String },

    #[error("insufficient history: have {bars} bars, need {minimum}")]
    InsufficientHistory { bars: usize, minimum: usize },

    #[error("invalid stop configuration: {reason}")]
    InvalidStopConfiguration { reason: String },

    #[error("bar series out of order at index {index} ({time})")]
    SeriesOrder { index: usize, time: NaiveDateTime },

    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("order rejected: {reason}")]
    Order { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    /// Recoverable conditions the caller retries on its own cadence.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TraderError::DataUnavailable { .. } | TraderError::InsufficientHistory { .. }
        )
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::Data { .. } | TraderError::SeriesOrder { .. } => 3,
            TraderError::UnknownStrategy { .. } | TraderError::InvalidStopConfiguration { .. } => 4,
            TraderError::DataUnavailable { .. } | TraderError::InsufficientHistory { .. } => 5,
            TraderError::Order { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
