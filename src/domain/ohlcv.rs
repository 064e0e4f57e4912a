//! OHLCV bar representation and the ordered bar series.

use crate::domain::error::TraderError;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Time-ascending sequence of bars with unique timestamps.
///
/// Ordering is checked once, here, when the series is built. Nothing
/// downstream sorts or reorders bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<OhlcvBar>,
}

impl BarSeries {
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, TraderError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(TraderError::SeriesOrder {
                    index: i + 1,
                    time: pair[1].time,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Bars `[0..=index]`: everything known at the close of bar `index`.
    pub fn slice_to(&self, index: usize) -> &[OhlcvBar] {
        let end = (index + 1).min(self.bars.len());
        &self.bars[..end]
    }

    /// Bars with `start <= time <= end`.
    pub fn within(&self, start: NaiveDateTime, end: NaiveDateTime) -> BarSeries {
        BarSeries {
            bars: self
                .bars
                .iter()
                .filter(|b| b.time >= start && b.time <= end)
                .cloned()
                .collect(),
        }
    }

    /// The most recent `count` bars.
    pub fn tail(&self, count: usize) -> BarSeries {
        let start = self.bars.len().saturating_sub(count);
        BarSeries {
            bars: self.bars[start..].to_vec(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl AsRef<[OhlcvBar]> for BarSeries {
    fn as_ref(&self) -> &[OhlcvBar] {
        &self.bars
    }
}

/// Bar interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        };
        f.write_str(s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.to_string() == upper)
            .ok_or_else(|| format!("unknown timeframe '{}'", s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            time: at(0),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: Some(50_000),
        }
    }

    fn bar_at(minute: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            time: at(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn series_accepts_ascending_bars() {
        let series = BarSeries::new(vec![bar_at(0, 1.0), bar_at(1, 1.1), bar_at(2, 1.2)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 1.1, 1.2]);
    }

    #[test]
    fn series_rejects_duplicate_timestamp() {
        let err = BarSeries::new(vec![bar_at(0, 1.0), bar_at(1, 1.1), bar_at(1, 1.2)]).unwrap_err();
        match err {
            TraderError::SeriesOrder { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn series_rejects_descending_bars() {
        let result = BarSeries::new(vec![bar_at(5, 1.0), bar_at(1, 1.1)]);
        assert!(matches!(result, Err(TraderError::SeriesOrder { index: 1, .. })));
    }

    #[test]
    fn slice_to_is_inclusive_and_clamped() {
        let series = BarSeries::new(vec![bar_at(0, 1.0), bar_at(1, 1.1), bar_at(2, 1.2)]).unwrap();
        assert_eq!(series.slice_to(0).len(), 1);
        assert_eq!(series.slice_to(1).len(), 2);
        assert_eq!(series.slice_to(10).len(), 3);
    }

    #[test]
    fn within_and_tail() {
        let series = BarSeries::new((0..10).map(|m| bar_at(m, 1.0 + m as f64)).collect()).unwrap();
        let window = series.within(at(2), at(4));
        assert_eq!(window.len(), 3);
        assert_eq!(window.first().unwrap().time, at(2));

        let tail = series.tail(4);
        assert_eq!(tail.len(), 4);
        assert_eq!(tail.last().unwrap().time, at(9));
        assert_eq!(series.tail(50).len(), 10);
    }

    #[test]
    fn timeframe_parse_and_display() {
        assert_eq!("m1".parse::<Timeframe>().unwrap(), Timeframe::M1);
        assert_eq!(" H1 ".parse::<Timeframe>().unwrap(), Timeframe::H1);
        assert_eq!(Timeframe::M15.to_string(), "M15");
        assert!("W1".parse::<Timeframe>().is_err());
    }
}
