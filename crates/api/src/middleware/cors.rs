//! CORS for the browser front end.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Allow the configured origin to POST GraphQL requests with a bearer token.
///
/// An origin that is not a valid header value disables cross-origin access
/// instead of failing startup; `ApiConfig` already validated it.
#[must_use]
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}
