//! HTTP endpoint handlers.
//!
//! The transcript endpoint keeps the presentation contract of the core:
//! always `200 text/plain`, with fetch problems folded into the payload's
//! two literal fallback strings rather than HTTP statuses.

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use yt_transcript_lib::{format_timestamp, FETCH_ERROR_MESSAGE, NO_TRANSCRIPT_MESSAGE};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Version information endpoint
pub async fn version_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    /// Playback position in seconds.
    pub t: f64,
}

/// Windowed transcript endpoint
pub async fn transcript_window(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Response> {
    state.metrics.record_request("/transcript");
    validate_video_id(&video_id)?;

    let text = match state.service.cached_window(&video_id, query.t) {
        Some(text) => {
            state.metrics.record_cache_hit();
            text
        }
        None => {
            state.metrics.record_cache_miss();
            state.service.transcript_window(&video_id, query.t).await
        }
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}

#[derive(Debug, serde::Serialize)]
pub struct PrefetchResponse {
    pub cached: bool,
}

/// Cache warm-up endpoint, the server-side analog of fetching on every
/// watch-page navigation
pub async fn prefetch(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<PrefetchResponse>> {
    state.metrics.record_request("/prefetch");
    validate_video_id(&video_id)?;

    let cached = state.service.prefetch(&video_id).await;
    Ok(Json(PrefetchResponse { cached }))
}

/// Cache statistics endpoint
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.metrics.record_request("/cache/stats");
    let stats = state.service.cache().stats();
    Json(serde_json::json!(stats))
}

#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    pub video_id: String,
    pub time_secs: f64,
}

/// Annotation endpoint: window the transcript, then ask the language model
/// for the cleaned text, keywords, and follow-up questions
pub async fn annotate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<serde_json::Value>> {
    state.metrics.record_request("/annotate");
    validate_video_id(&request.video_id)?;

    let Some(openai) = &state.openai else {
        state.metrics.record_error("not_configured");
        return Err(ServerError::NotConfigured(
            "no OpenAI API key configured".to_string(),
        ));
    };

    let paused_at = format_timestamp(request.time_secs);
    let transcript = state
        .service
        .transcript_window(&request.video_id, request.time_secs)
        .await;

    // Don't spend an upstream call on the fallback strings or an empty
    // window; answer with the bare transcript shape instead.
    if transcript.is_empty()
        || transcript == NO_TRANSCRIPT_MESSAGE
        || transcript == FETCH_ERROR_MESSAGE
    {
        return Ok(Json(serde_json::json!({
            "paused_at": paused_at,
            "annotation": {
                "transcript": transcript,
                "keywords": {},
                "questions": [],
            },
        })));
    }

    state.metrics.record_annotation();
    let content = match openai.annotate(&transcript).await {
        Ok(content) => content,
        Err(err) => {
            state.metrics.record_error("upstream");
            return Err(err);
        }
    };

    // The model is instructed to answer in JSON; pass malformed content
    // through as a plain string rather than failing the request.
    let annotation = serde_json::from_str::<serde_json::Value>(&content)
        .unwrap_or_else(|_| serde_json::Value::String(content));

    Ok(Json(serde_json::json!({
        "paused_at": paused_at,
        "annotation": annotation,
    })))
}

fn validate_video_id(video_id: &str) -> Result<()> {
    if video_id.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "video id must not be empty".to_string(),
        ));
    }
    Ok(())
}
