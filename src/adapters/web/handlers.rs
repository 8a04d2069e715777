//! HTTP request handlers for web adapter.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::error::CommandError;
use crate::domain::evaluator::{self, ActionOutcome};
use crate::domain::market::{StockData, SymbolMatch};

use super::{AppState, WebError};

pub const ROOT_MESSAGE: &str = "InvestIQ backend is running!";
pub const STOCK_NOT_FOUND: &str = "Stock data not found";
pub const NO_MATCHES: &str = "No matches found";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Command result. `status` tags which branch produced `message`.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: String,
    pub status: &'static str,
}

impl From<Result<ActionOutcome, CommandError>> for ActionResponse {
    fn from(result: Result<ActionOutcome, CommandError>) -> Self {
        match result {
            Ok(outcome) => Self {
                message: outcome.message(),
                status: outcome.kind(),
            },
            Err(err) => Self {
                message: err.to_string(),
                status: err.kind(),
            },
        }
    }
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<StockData>, WebError> {
    let symbol = symbol.to_uppercase();
    match state.market.fetch_stock(&symbol).await {
        Ok(Some(data)) if !data.is_empty() => Ok(Json(data)),
        Ok(_) => Err(WebError::not_found(STOCK_NOT_FOUND)),
        Err(e) => {
            tracing::warn!(%symbol, error = %e, "stock data fetch failed");
            Err(WebError::not_found(STOCK_NOT_FOUND))
        }
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<SymbolMatch>>, WebError> {
    match state.market.search_symbols(&keyword).await {
        Ok(matches) if !matches.is_empty() => Ok(Json(matches)),
        Ok(_) => Err(WebError::not_found(NO_MATCHES)),
        Err(e) => {
            tracing::warn!(%keyword, error = %e, "symbol search failed");
            Err(WebError::not_found(NO_MATCHES))
        }
    }
}

/// `query` may be absent (treated as empty text) but must be a string when
/// present.
fn extract_query(body: &Value) -> Result<&str, CommandError> {
    match body.get("query") {
        None => Ok(""),
        Some(Value::String(query)) => Ok(query.as_str()),
        Some(other) => Err(CommandError::Unexpected(format!(
            "'query' must be a string, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub async fn execute_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActionResponse>, WebError> {
    // Unreadable bodies answer 422 like every other request validation failure.
    let Json(body) = payload.map_err(|e| WebError::unprocessable(e.body_text()))?;
    if !body.is_object() {
        return Err(WebError::unprocessable(format!(
            "request body must be a JSON object, got {}",
            json_type_name(&body)
        )));
    }

    let result = match extract_query(&body) {
        Ok(query) => evaluator::run_query(&*state.market, query, &state.history_period).await,
        Err(e) => Err(e),
    };
    Ok(Json(ActionResponse::from(result)))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}
