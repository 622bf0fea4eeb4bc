//! Prometheus-compatible metrics endpoint

use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Server start time
    start_time: Instant,
    /// Total requests processed
    request_count: RwLock<u64>,
    /// Requests by endpoint
    requests_by_endpoint: RwLock<HashMap<String, u64>>,
    /// Transcript cache hits
    cache_hits: RwLock<u64>,
    /// Transcript cache misses
    cache_misses: RwLock<u64>,
    /// Annotation calls sent upstream
    annotations: RwLock<u64>,
    /// Errors by type
    errors_by_type: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            request_count: RwLock::new(0),
            requests_by_endpoint: RwLock::new(HashMap::new()),
            cache_hits: RwLock::new(0),
            cache_misses: RwLock::new(0),
            annotations: RwLock::new(0),
            errors_by_type: RwLock::new(HashMap::new()),
        }
    }

    /// Record a request
    pub fn record_request(&self, endpoint: &str) {
        *self.request_count.write() += 1;
        *self
            .requests_by_endpoint
            .write()
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    /// Record cache hit
    pub fn record_cache_hit(&self) {
        *self.cache_hits.write() += 1;
    }

    /// Record cache miss
    pub fn record_cache_miss(&self) {
        *self.cache_misses.write() += 1;
    }

    /// Record an annotation call
    pub fn record_annotation(&self) {
        *self.annotations.write() += 1;
    }

    /// Record error
    pub fn record_error(&self, error_type: &str) {
        *self
            .errors_by_type
            .write()
            .entry(error_type.to_string())
            .or_insert(0) += 1;
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP transcript_server_uptime_seconds Server uptime in seconds\n");
        output.push_str("# TYPE transcript_server_uptime_seconds counter\n");
        output.push_str(&format!(
            "transcript_server_uptime_seconds {}\n",
            self.uptime_secs()
        ));

        output.push_str("\n# HELP transcript_requests_total Total number of HTTP requests\n");
        output.push_str("# TYPE transcript_requests_total counter\n");
        output.push_str(&format!(
            "transcript_requests_total {}\n",
            *self.request_count.read()
        ));

        output.push_str("\n# HELP transcript_requests_by_endpoint Requests by endpoint\n");
        output.push_str("# TYPE transcript_requests_by_endpoint counter\n");
        for (endpoint, count) in self.requests_by_endpoint.read().iter() {
            output.push_str(&format!(
                "transcript_requests_by_endpoint{{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }

        output.push_str("\n# HELP transcript_cache_hits_total Total transcript cache hits\n");
        output.push_str("# TYPE transcript_cache_hits_total counter\n");
        output.push_str(&format!(
            "transcript_cache_hits_total {}\n",
            *self.cache_hits.read()
        ));

        output.push_str("\n# HELP transcript_cache_misses_total Total transcript cache misses\n");
        output.push_str("# TYPE transcript_cache_misses_total counter\n");
        output.push_str(&format!(
            "transcript_cache_misses_total {}\n",
            *self.cache_misses.read()
        ));

        let hits = *self.cache_hits.read();
        let misses = *self.cache_misses.read();
        let hit_ratio = if hits + misses > 0 {
            hits as f64 / (hits + misses) as f64
        } else {
            0.0
        };
        output.push_str("\n# HELP transcript_cache_hit_ratio Cache hit ratio\n");
        output.push_str("# TYPE transcript_cache_hit_ratio gauge\n");
        output.push_str(&format!("transcript_cache_hit_ratio {:.4}\n", hit_ratio));

        output.push_str("\n# HELP transcript_annotations_total Annotation calls sent upstream\n");
        output.push_str("# TYPE transcript_annotations_total counter\n");
        output.push_str(&format!(
            "transcript_annotations_total {}\n",
            *self.annotations.read()
        ));

        output.push_str("\n# HELP transcript_errors_total Total errors by type\n");
        output.push_str("# TYPE transcript_errors_total counter\n");
        for (error_type, count) in self.errors_by_type.read().iter() {
            output.push_str(&format!(
                "transcript_errors_total{{type=\"{}\"}} {}\n",
                error_type, count
            ));
        }

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let body = state.metrics.export_prometheus();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
