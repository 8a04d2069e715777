//! Daily OHLCV bar representation.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Close of the most recent bar by date, skipping non-finite closes.
pub fn latest_close(bars: &[OhlcvBar]) -> Option<f64> {
    bars.iter()
        .filter(|b| b.close.is_finite())
        .max_by_key(|b| b.date)
        .map(|b| b.close)
}
