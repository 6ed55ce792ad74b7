mod health;
mod metrics;
mod predict;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub use predict::{PredictError, ValidationError, IMAGE_FIELD};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/health_check", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api/predict", post(predict::predict))
}
