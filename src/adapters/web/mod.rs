//! Web server adapter.
//!
//! JSON API served with Axum: liveness, stock data, symbol search and the
//! conditional command endpoint.

mod cors;
mod error;
mod handlers;

pub use cors::cors_layer;
pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::error::InvestiqError;
use crate::domain::settings::CorsSettings;
use crate::ports::market_data_port::MarketDataPort;

pub struct AppState {
    pub market: Arc<dyn MarketDataPort>,
    /// History period passed to the price oracle for commands.
    pub history_period: String,
}

pub fn build_router(state: AppState, cors: &CorsSettings) -> Result<Router, InvestiqError> {
    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/stock/{symbol}", get(handlers::get_stock))
        .route("/search/{keyword}", get(handlers::search))
        .route("/ai/execute-action", post(handlers::execute_action))
        .fallback(handlers::not_found)
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}
