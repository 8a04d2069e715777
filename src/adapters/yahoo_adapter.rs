//! Yahoo Finance HTTP market data adapter.
//!
//! Uses the public chart endpoint for prices and history and the search
//! endpoint for symbol lookup. No API key is needed.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::error::InvestiqError;
use crate::domain::market::{PriceQuote, StockData, SymbolMatch};
use crate::domain::ohlcv::{latest_close, OhlcvBar};
use crate::domain::settings::ProviderSettings;
use crate::ports::market_data_port::MarketDataPort;

const USER_AGENT: &str = concat!("investiq/", env!("CARGO_PKG_VERSION"));

pub struct YahooAdapter {
    client: Client,
    chart_url: String,
    search_url: String,
    stock_range: String,
    search_limit: usize,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    full_exchange_name: Option<String>,
    exchange_name: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: Option<String>,
    #[serde(rename = "longname")]
    long_name: Option<String>,
    #[serde(rename = "shortname")]
    short_name: Option<String>,
    exch_disp: Option<String>,
    exchange: Option<String>,
    quote_type: Option<String>,
}

impl ChartResult {
    /// Bars with a close value, in timestamp order.
    fn bars(&self) -> Vec<OhlcvBar> {
        let series = self.indicators.quote.first();
        let at = |values: Option<&Vec<Option<f64>>>, i: usize| {
            values.and_then(|v| v.get(i).copied().flatten())
        };

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                let close = at(series.map(|s| &s.close), i)?;
                let date = timestamp_to_date(*ts)?;
                Some(OhlcvBar {
                    date,
                    open: at(series.map(|s| &s.open), i).unwrap_or(close),
                    high: at(series.map(|s| &s.high), i).unwrap_or(close),
                    low: at(series.map(|s| &s.low), i).unwrap_or(close),
                    close,
                    volume: at(series.map(|s| &s.volume), i).unwrap_or(0.0) as i64,
                })
            })
            .collect()
    }
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

impl YahooAdapter {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, InvestiqError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| InvestiqError::provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            chart_url: settings.chart_url.clone(),
            search_url: settings.search_url.clone(),
            stock_range: settings.stock_range.clone(),
            search_limit: settings.search_limit,
        })
    }

    fn chart_endpoint(&self, symbol: &str) -> Result<Url, InvestiqError> {
        let mut url = Url::parse(&self.chart_url)
            .map_err(|e| InvestiqError::provider(format!("invalid chart_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| InvestiqError::provider("chart_url cannot take a path"))?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }

    /// `None` when the provider does not know the symbol.
    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Option<ChartResult>, InvestiqError> {
        let url = self.chart_endpoint(symbol)?;
        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| InvestiqError::provider(format!("chart request for {symbol} failed: {e}")))?;

        let status = response.status();
        let envelope: ChartEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(InvestiqError::provider(format!(
                    "invalid chart response for {symbol}: {e}"
                )));
            }
            Err(_) => {
                return Err(InvestiqError::provider(format!(
                    "chart request for {symbol} failed with HTTP {status}"
                )));
            }
        };

        if let Some(err) = envelope.chart.error {
            if err.code.eq_ignore_ascii_case("not found") {
                return Ok(None);
            }
            return Err(InvestiqError::provider(match err.description {
                Some(description) => format!("{}: {}", err.code, description),
                None => err.code,
            }));
        }

        Ok(envelope.chart.result.and_then(|r| r.into_iter().next()))
    }
}

#[async_trait]
impl MarketDataPort for YahooAdapter {
    async fn fetch_stock(&self, symbol: &str) -> Result<Option<StockData>, InvestiqError> {
        let Some(chart) = self.fetch_chart(symbol, &self.stock_range).await? else {
            return Ok(None);
        };

        let history = chart.bars();
        let meta = chart.meta;
        let data = StockData {
            symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
            name: meta.long_name.or(meta.short_name),
            currency: meta.currency,
            exchange: meta.full_exchange_name.or(meta.exchange_name),
            price: meta.regular_market_price.or_else(|| latest_close(&history)),
            previous_close: meta.previous_close.or(meta.chart_previous_close),
            day_high: meta.regular_market_day_high,
            day_low: meta.regular_market_day_low,
            volume: meta.regular_market_volume.map(|v| v as i64),
            history,
        };
        Ok((!data.is_empty()).then_some(data))
    }

    async fn search_symbols(&self, keyword: &str) -> Result<Vec<SymbolMatch>, InvestiqError> {
        let limit = self.search_limit.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", keyword),
                ("quotesCount", limit.as_str()),
                ("newsCount", "0"),
            ])
            .send()
            .await
            .map_err(|e| InvestiqError::provider(format!("search for '{keyword}' failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvestiqError::provider(format!(
                "search for '{keyword}' failed with HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| InvestiqError::provider(format!("invalid search response: {e}")))?;

        Ok(body
            .quotes
            .into_iter()
            .filter_map(|q| {
                Some(SymbolMatch {
                    symbol: q.symbol?,
                    name: q.long_name.or(q.short_name),
                    exchange: q.exch_disp.or(q.exchange),
                    quote_type: q.quote_type,
                })
            })
            .collect())
    }

    async fn latest_close(&self, symbol: &str, period: &str) -> Result<PriceQuote, InvestiqError> {
        let price = self
            .fetch_chart(symbol, period)
            .await?
            .and_then(|chart| latest_close(&chart.bars()))
            .ok_or_else(|| InvestiqError::NoData {
                symbol: symbol.to_string(),
            })?;

        Ok(PriceQuote {
            symbol: symbol.to_string(),
            price,
        })
    }
}
