//! Market data value types returned by providers.

use serde::Serialize;

use crate::domain::ohlcv::OhlcvBar;

/// Latest available close for a symbol. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
}

/// Combined snapshot served by `GET /stock/{symbol}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockData {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<i64>,
    pub history: Vec<OhlcvBar>,
}

impl StockData {
    /// A snapshot with neither a price nor any history carries no data.
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.history.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub quote_type: Option<String>,
}
