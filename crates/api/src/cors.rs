//! Cross-origin policy for the remote backend.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use pixdrop_shared::{AppError, AppResult, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};

/// Builds the CORS layer: listed origins with credentials, fixed methods and
/// headers, 12 hour preflight cache.
///
/// # Errors
///
/// Returns a configuration error if an origin is not a valid header value.
pub fn cors_layer(config: &CorsConfig) -> AppResult<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| AppError::Configuration(format!("invalid CORS origin: {origin}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let methods = CorsConfig::ALLOWED_METHODS
        .iter()
        .map(|m| {
            Method::from_bytes(m.as_bytes())
                .map_err(|_| AppError::Configuration(format!("invalid CORS method: {m}")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(header_names(&CorsConfig::ALLOWED_HEADERS)?))
        .expose_headers(ExposeHeaders::list(header_names(&CorsConfig::EXPOSED_HEADERS)?))
        .allow_credentials(true)
        .max_age(Duration::from_secs(CorsConfig::MAX_AGE_SECS)))
}

fn header_names(names: &[&str]) -> AppResult<Vec<HeaderName>> {
    names
        .iter()
        .map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| AppError::Configuration(format!("invalid CORS header: {name}")))
        })
        .collect()
}
