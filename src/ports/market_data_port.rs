//! Market data access port trait.

use async_trait::async_trait;

use crate::domain::error::InvestiqError;
use crate::domain::market::{PriceQuote, StockData, SymbolMatch};

/// External market data provider.
///
/// `latest_close` is the price oracle behind conditional commands; it must
/// fail rather than return a quote when the provider has no closes for the
/// requested period.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Combined snapshot for `symbol`, `None` when the provider knows nothing.
    async fn fetch_stock(&self, symbol: &str) -> Result<Option<StockData>, InvestiqError>;

    async fn search_symbols(&self, keyword: &str) -> Result<Vec<SymbolMatch>, InvestiqError>;

    /// Most recent close over `period` (e.g. `1d`).
    async fn latest_close(&self, symbol: &str, period: &str) -> Result<PriceQuote, InvestiqError>;
}
