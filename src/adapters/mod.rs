//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;

use std::sync::Arc;

use crate::domain::error::InvestiqError;
use crate::domain::settings::{ProviderKind, ProviderSettings};
use crate::ports::market_data_port::MarketDataPort;

/// Build the market data provider selected by `[provider] kind`.
pub fn market_data_from_settings(
    settings: &ProviderSettings,
) -> Result<Arc<dyn MarketDataPort>, InvestiqError> {
    match settings.kind {
        ProviderKind::Csv => {
            let dir = settings
                .csv_dir
                .clone()
                .ok_or_else(|| InvestiqError::ConfigMissing {
                    section: "provider".to_string(),
                    key: "csv_dir".to_string(),
                })?;
            Ok(Arc::new(csv_adapter::CsvAdapter::new(dir, settings.search_limit)))
        }
        #[cfg(feature = "yahoo")]
        ProviderKind::Yahoo => Ok(Arc::new(yahoo_adapter::YahooAdapter::from_settings(
            settings,
        )?)),
        #[cfg(not(feature = "yahoo"))]
        ProviderKind::Yahoo => Err(InvestiqError::ConfigInvalid {
            section: "provider".to_string(),
            key: "kind".to_string(),
            reason: "yahoo feature is required for the yahoo provider".to_string(),
        }),
    }
}
