use crate::error::AppError;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// CORS policy admitting exactly one trusted origin, with credentialed
/// requests allowed.
pub fn single_origin_cors(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = origin.parse::<HeaderValue>().map_err(|e| {
        tracing::error!("Invalid CORS origin '{}': {}", origin, e);
        AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}
