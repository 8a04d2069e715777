#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use investiq::domain::error::InvestiqError;
use investiq::domain::market::{PriceQuote, StockData, SymbolMatch};
pub use investiq::domain::ohlcv::OhlcvBar;
use investiq::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory market data provider with per-symbol prices, snapshots and errors.
pub struct MockMarketData {
    pub prices: HashMap<String, f64>,
    pub stocks: HashMap<String, StockData>,
    pub matches: HashMap<String, Vec<SymbolMatch>>,
    pub errors: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            stocks: HashMap::new(),
            matches: HashMap::new(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_stock(mut self, data: StockData) -> Self {
        self.stocks.insert(data.symbol.clone(), data);
        self
    }

    pub fn with_matches(mut self, keyword: &str, symbols: &[&str]) -> Self {
        let matches = symbols
            .iter()
            .map(|s| SymbolMatch {
                symbol: s.to_string(),
                name: Some(format!("{} Inc.", s)),
                exchange: Some("NASDAQ".to_string()),
                quote_type: Some("EQUITY".to_string()),
            })
            .collect();
        self.matches.insert(keyword.to_string(), matches);
        self
    }

    pub fn with_error(mut self, key: &str, reason: &str) -> Self {
        self.errors.insert(key.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_error(&self, key: &str) -> Result<(), InvestiqError> {
        match self.errors.get(key) {
            Some(reason) => Err(InvestiqError::Provider {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn fetch_stock(&self, symbol: &str) -> Result<Option<StockData>, InvestiqError> {
        self.record(format!("stock:{symbol}"));
        self.check_error(symbol)?;
        Ok(self.stocks.get(symbol).cloned())
    }

    async fn search_symbols(&self, keyword: &str) -> Result<Vec<SymbolMatch>, InvestiqError> {
        self.record(format!("search:{keyword}"));
        self.check_error(keyword)?;
        Ok(self.matches.get(keyword).cloned().unwrap_or_default())
    }

    async fn latest_close(&self, symbol: &str, period: &str) -> Result<PriceQuote, InvestiqError> {
        self.record(format!("close:{symbol}:{period}"));
        self.check_error(symbol)?;
        match self.prices.get(symbol) {
            Some(price) => Ok(PriceQuote {
                symbol: symbol.to_string(),
                price: *price,
            }),
            None => Err(InvestiqError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000,
    }
}

pub fn make_stock(symbol: &str, closes: &[f64]) -> StockData {
    let history: Vec<OhlcvBar> = closes
        .iter()
        .enumerate()
        .map(|(i, c)| make_bar(&format!("2024-01-{:02}", i + 1), *c))
        .collect();
    StockData {
        symbol: symbol.to_string(),
        name: Some(format!("{} Corp", symbol)),
        currency: Some("USD".to_string()),
        price: closes.last().copied(),
        history,
        ..Default::default()
    }
}
