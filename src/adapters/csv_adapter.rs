//! CSV directory market data adapter.
//!
//! Offline provider: each symbol lives in `<base_path>/<SYMBOL>.csv` with a
//! `date,open,high,low,close,volume` header. The history period passed to
//! [`MarketDataPort::latest_close`] is ignored; the last bar in the file is
//! always the latest close.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::error::InvestiqError;
use crate::domain::market::{PriceQuote, StockData, SymbolMatch};
use crate::domain::ohlcv::{latest_close, OhlcvBar};
use crate::ports::market_data_port::MarketDataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
    search_limit: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf, search_limit: usize) -> Self {
        Self {
            base_path,
            search_limit,
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }

    /// Bars sorted by date, or `None` when the symbol has no file. Symbols
    /// containing anything but word characters never name a file.
    async fn read_bars(&self, symbol: &str) -> Result<Option<Vec<OhlcvBar>>, InvestiqError> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Ok(None);
        }
        let path = self.csv_path(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InvestiqError::provider(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row.map_err(|e| {
                InvestiqError::provider(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            bars.push(OhlcvBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(Some(bars))
    }
}

#[async_trait]
impl MarketDataPort for CsvAdapter {
    async fn fetch_stock(&self, symbol: &str) -> Result<Option<StockData>, InvestiqError> {
        let Some(bars) = self.read_bars(symbol).await? else {
            return Ok(None);
        };

        let last = bars.last();
        let data = StockData {
            symbol: symbol.to_uppercase(),
            price: latest_close(&bars),
            previous_close: bars.len().checked_sub(2).map(|i| bars[i].close),
            day_high: last.map(|b| b.high),
            day_low: last.map(|b| b.low),
            volume: last.map(|b| b.volume),
            history: bars,
            ..Default::default()
        };
        Ok((!data.is_empty()).then_some(data))
    }

    async fn search_symbols(&self, keyword: &str) -> Result<Vec<SymbolMatch>, InvestiqError> {
        let mut entries = tokio::fs::read_dir(&self.base_path).await.map_err(|e| {
            InvestiqError::provider(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let needle = keyword.trim().to_uppercase();
        let mut symbols = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InvestiqError::provider(format!("directory entry error: {}", e)))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".csv") {
                let symbol = stem.to_uppercase();
                if !needle.is_empty() && symbol.contains(&needle) {
                    symbols.push(symbol);
                }
            }
        }

        symbols.sort();
        symbols.truncate(self.search_limit);
        Ok(symbols
            .into_iter()
            .map(|symbol| SymbolMatch {
                symbol,
                name: None,
                exchange: None,
                quote_type: None,
            })
            .collect())
    }

    async fn latest_close(&self, symbol: &str, _period: &str) -> Result<PriceQuote, InvestiqError> {
        let bars = self.read_bars(symbol).await?.unwrap_or_default();
        let price = latest_close(&bars).ok_or_else(|| InvestiqError::NoData {
            symbol: symbol.to_string(),
        })?;
        Ok(PriceQuote {
            symbol: symbol.to_string(),
            price,
        })
    }
}
