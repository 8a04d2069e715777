//! Cross-origin layer built from [`CorsSettings`].

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::domain::error::InvestiqError;
use crate::domain::settings::CorsSettings;

/// Allow the configured origin only. Methods and headers are mirrored from the
/// request, which tower-http permits together with credentials where a
/// wildcard would not be.
pub fn cors_layer(settings: &CorsSettings) -> Result<CorsLayer, InvestiqError> {
    let origin = HeaderValue::from_str(&settings.allowed_origin).map_err(|e| {
        InvestiqError::ConfigInvalid {
            section: "cors".to_string(),
            key: "allow_origin".to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(settings.allow_credentials))
}
