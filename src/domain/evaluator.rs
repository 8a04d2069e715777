//! Condition evaluation for parsed commands.
//!
//! A command is checked once, against the price at request time. Nothing is
//! executed; "buying" and "selling" only label the resulting message.

use serde::Serialize;

use crate::domain::command::{format_price, Action, CommandIntent};
use crate::domain::command_parser;
use crate::domain::error::CommandError;
use crate::ports::market_data_port::MarketDataPort;

/// History period used for the price check unless configured otherwise.
pub const DEFAULT_PERIOD: &str = "1d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub intent: CommandIntent,
    pub price: f64,
    pub condition_met: bool,
}

impl ActionOutcome {
    pub fn message(&self) -> String {
        let symbol = &self.intent.symbol;
        let price = format_price(self.price);
        match (self.intent.action, self.condition_met) {
            (Action::Buy, true) => format!("Action: Buying {symbol} at ${price}. Condition met!"),
            (Action::Sell, true) => {
                format!("Action: Selling {symbol} at ${price}. Condition met!")
            }
            (Action::Buy, false) => {
                format!("Action: Price of {symbol} is ${price}. Buy condition not met.")
            }
            (Action::Sell, false) => {
                format!("Action: Price of {symbol} is ${price}. Sell condition not met.")
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.condition_met {
            "condition_met"
        } else {
            "condition_not_met"
        }
    }
}

pub fn evaluate(intent: CommandIntent, price: f64) -> ActionOutcome {
    let condition_met = intent.is_met_by(price);
    ActionOutcome {
        intent,
        price,
        condition_met,
    }
}

/// Fetch the current price for `intent.symbol` and evaluate the condition.
pub async fn execute(
    market: &dyn MarketDataPort,
    intent: CommandIntent,
    period: &str,
) -> Result<ActionOutcome, CommandError> {
    let quote = market
        .latest_close(&intent.symbol, period)
        .await
        .map_err(|e| {
            tracing::warn!(symbol = %intent.symbol, error = %e, "price fetch failed");
            CommandError::PriceFetch {
                symbol: intent.symbol.clone(),
                reason: e.to_string(),
            }
        })?;

    let outcome = evaluate(intent, quote.price);
    tracing::debug!(
        intent = %outcome.intent,
        price = outcome.price,
        met = outcome.condition_met,
        "command evaluated"
    );
    Ok(outcome)
}

/// Parse `query` and run it.
pub async fn run_query(
    market: &dyn MarketDataPort,
    query: &str,
    period: &str,
) -> Result<ActionOutcome, CommandError> {
    let intent = command_parser::parse(query)?;
    execute(market, intent, period).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::InvestiqError;
    use crate::domain::market::{PriceQuote, StockData, SymbolMatch};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedPrices {
        prices: HashMap<String, f64>,
        periods: Mutex<Vec<String>>,
    }

    impl FixedPrices {
        fn new(prices: &[(&str, f64)]) -> Self {
            Self {
                prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
                periods: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataPort for FixedPrices {
        async fn fetch_stock(&self, _symbol: &str) -> Result<Option<StockData>, InvestiqError> {
            Ok(None)
        }

        async fn search_symbols(&self, _keyword: &str) -> Result<Vec<SymbolMatch>, InvestiqError> {
            Ok(Vec::new())
        }

        async fn latest_close(&self, symbol: &str, period: &str) -> Result<PriceQuote, InvestiqError> {
            self.periods.lock().unwrap().push(period.to_string());
            self.prices
                .get(symbol)
                .map(|price| PriceQuote {
                    symbol: symbol.to_string(),
                    price: *price,
                })
                .ok_or_else(|| InvestiqError::NoData {
                    symbol: symbol.to_string(),
                })
        }
    }

    fn intent(action: Action, symbol: &str, threshold: f64) -> CommandIntent {
        CommandIntent {
            action,
            symbol: symbol.into(),
            threshold,
        }
    }

    #[test]
    fn buy_met_message() {
        let outcome = evaluate(intent(Action::Buy, "AAPL", 150.5), 140.0);
        assert!(outcome.condition_met);
        assert_eq!(outcome.message(), "Action: Buying AAPL at $140.0. Condition met!");
        assert_eq!(outcome.kind(), "condition_met");
    }

    #[test]
    fn buy_not_met_at_threshold() {
        let outcome = evaluate(intent(Action::Buy, "AAPL", 150.0), 150.0);
        assert!(!outcome.condition_met);
        assert_eq!(
            outcome.message(),
            "Action: Price of AAPL is $150.0. Buy condition not met."
        );
    }

    #[test]
    fn sell_met_message() {
        let outcome = evaluate(intent(Action::Sell, "TSLA", 700.0), 712.34);
        assert_eq!(outcome.message(), "Action: Selling TSLA at $712.34. Condition met!");
    }

    #[test]
    fn sell_not_met_message() {
        let outcome = evaluate(intent(Action::Sell, "TSLA", 700.0), 650.0);
        assert_eq!(
            outcome.message(),
            "Action: Price of TSLA is $650.0. Sell condition not met."
        );
        assert_eq!(outcome.kind(), "condition_not_met");
    }

    #[tokio::test]
    async fn run_query_buy_condition_met() {
        let market = FixedPrices::new(&[("AAPL", 140.0)]);
        let outcome = run_query(&market, "Buy AAPL if price goes below 150.5", DEFAULT_PERIOD)
            .await
            .unwrap();
        assert!(outcome.message().contains("Buying AAPL at $140.0. Condition met!"));
        assert_eq!(market.periods.lock().unwrap().as_slice(), ["1d"]);
    }

    #[tokio::test]
    async fn run_query_sell_condition_not_met() {
        let market = FixedPrices::new(&[("TSLA", 650.0)]);
        let outcome = run_query(&market, "sell tsla if price goes above 700", DEFAULT_PERIOD)
            .await
            .unwrap();
        assert!(outcome.message().contains("not met"));
    }

    #[tokio::test]
    async fn run_query_reports_price_fetch_error() {
        let market = FixedPrices::new(&[]);
        let err = run_query(&market, "buy zzzz if price goes below 1", DEFAULT_PERIOD)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "price_fetch_error");
        assert_eq!(
            err.to_string(),
            "Error fetching stock data for ZZZZ: no price data found for ZZZZ"
        );
    }

    #[tokio::test]
    async fn run_query_rejects_invalid_text_without_fetching() {
        let market = FixedPrices::new(&[("AAPL", 140.0)]);
        let err = run_query(&market, "hold aapl forever", DEFAULT_PERIOD)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Parse(_)));
        assert!(market.periods.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn execute_passes_configured_period() {
        let market = FixedPrices::new(&[("MSFT", 300.0)]);
        execute(&market, intent(Action::Sell, "MSFT", 1.0), "5d")
            .await
            .unwrap();
        assert_eq!(market.periods.lock().unwrap().as_slice(), ["5d"]);
    }
}
