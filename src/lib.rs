mod cors;
mod routes;

pub mod app;
pub mod classifier;
pub mod config;
pub mod server;
pub mod telemetry;

pub use app::start_app;
pub use routes::{PredictError, ValidationError, IMAGE_FIELD};
