use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{any, get},
};
use std::sync::Arc;

use crate::review::MAX_BODY_BYTES;
use crate::state::AppState;

mod health;
mod metrics;
mod review;
pub mod serverless;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use review::review_handler;

// Every method reaches the review handler so non-POST gets a JSON 405
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/review", any(review_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
