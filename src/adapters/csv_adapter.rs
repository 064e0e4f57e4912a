//! CSV file market data adapter.
//!
//! One file per instrument and timeframe: `{dir}/{SYMBOL}_{TIMEFRAME}.csv`
//! with a header row naming `time,open,high,low,close` and optionally
//! `volume`. `time` is `YYYY-MM-DD HH:MM:SS` or unix seconds.

use crate::domain::config_validation::parse_datetime;
use crate::domain::error::TraderError;
use crate::domain::ohlcv::{BarSeries, OhlcvBar, Timeframe};
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, TraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| TraderError::Data {
                reason: format!("missing {name} column"),
            })
        };
        Ok(Columns {
            time: require("time")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), timeframe))
    }

    fn read_all(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<OhlcvBar>, TraderError> {
        let path = self.csv_path(symbol, timeframe);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(unavailable(symbol, timeframe));
            }
            Err(e) => return Err(TraderError::Io(e)),
        };
        debug!(path = %path.display(), "reading bars");

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| TraderError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            bars.push(parse_bar(&record, &columns).map_err(|reason| TraderError::Data {
                reason: format!("{} row {}: {}", path.display(), row + 1, reason),
            })?);
        }

        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

fn parse_bar(record: &StringRecord, columns: &Columns) -> Result<OhlcvBar, String> {
    let field = |index: usize, name: &str| {
        record
            .get(index)
            .map(str::trim)
            .ok_or_else(|| format!("missing {name} value"))
    };
    let price = |index: usize, name: &str| -> Result<f64, String> {
        let raw = field(index, name)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
            _ => Err(format!("invalid {name} value '{raw}'")),
        }
    };

    let raw_time = field(columns.time, "time")?;
    let time = parse_time(raw_time).ok_or_else(|| format!("invalid time '{raw_time}'"))?;

    let volume = match columns.volume.and_then(|i| record.get(i)).map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|e| format!("invalid volume value: {e}"))?,
        ),
    };

    Ok(OhlcvBar {
        time,
        open: price(columns.open, "open")?,
        high: price(columns.high, "high")?,
        low: price(columns.low, "low")?,
        close: price(columns.close, "close")?,
        volume,
    })
}

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    match raw.parse::<i64>() {
        Ok(secs) => DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc()),
        Err(_) => parse_datetime(raw),
    }
}

fn unavailable(symbol: &str, timeframe: Timeframe) -> TraderError {
    TraderError::DataUnavailable {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BarSeries, TraderError> {
        let bars: Vec<OhlcvBar> = self
            .read_all(symbol, timeframe)?
            .into_iter()
            .filter(|b| b.time >= start && b.time <= end)
            .collect();
        if bars.is_empty() {
            return Err(unavailable(symbol, timeframe));
        }
        BarSeries::new(bars)
    }

    fn fetch_latest(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<BarSeries, TraderError> {
        let series = BarSeries::new(self.read_all(symbol, timeframe)?)?.tail(count);
        if series.is_empty() {
            return Err(unavailable(symbol, timeframe));
        }
        Ok(series)
    }
}
