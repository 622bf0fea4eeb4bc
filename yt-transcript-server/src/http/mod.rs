//! HTTP server module

pub mod handlers;
pub mod middleware;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/version", get(handlers::version_check))
        .route("/transcript/{video_id}", get(handlers::transcript_window))
        .route("/transcript/{video_id}/prefetch", post(handlers::prefetch))
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/annotate", post(handlers::annotate))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(middleware::request_logger))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
