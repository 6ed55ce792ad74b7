use crate::config::CorsConfig;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    let mut any_origin = false;
    let mut origins = Vec::new();

    for raw in &cors.allowed_origins {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        if value == "*" {
            any_origin = true;
            continue;
        }
        match HeaderValue::from_str(value) {
            Ok(origin) => origins.push(origin),
            Err(_) => tracing::warn!("Ignoring invalid CORS origin: {}", value),
        }
    }

    if !any_origin && origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if any_origin {
        Some(layer.allow_origin(Any))
    } else {
        Some(layer.allow_origin(origins))
    }
}
