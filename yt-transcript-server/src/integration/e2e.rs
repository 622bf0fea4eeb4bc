//! End-to-end tests: a stub YouTube serves canned watch pages and
//! timed-text, and requests go through the full router.

use crate::config::AppConfig;
use crate::http::create_router;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower::ServiceExt;
use yt_transcript_lib::CacheConfig;

const TIMED_TEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="5">a</text>
<text start="15" dur="5">b</text>
<text start="40" dur="5">c</text>
</transcript>"#;

fn watch_page(track_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{track_url}","name":{{"simpleText":"English"}},"languageCode":"en"}}],"translationLanguages":[]}}}},"videoDetails":{{"videoId":"x","title":"t"}}}};</script></body></html>"#
    )
}

const WATCH_PAGE_NO_CAPTIONS: &str = r#"<!DOCTYPE html><html><body><script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"videoDetails":{"videoId":"x"}};</script></body></html>"#;

/// Serve captionless watch pages on an ephemeral port.
async fn start_captionless_youtube() -> String {
    let app = Router::new().route(
        "/watch",
        get(|| async { Html(WATCH_PAGE_NO_CAPTIONS.to_string()) }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn test_config(youtube_url: String) -> AppConfig {
    AppConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        youtube_url,
        cache: CacheConfig::default(),
        openai_api_key: None,
        openai_endpoint: None,
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_router(Arc::new(AppState::new(test_config(
        "http://127.0.0.1:1".to_string(),
    ))));

    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"status\":\"online\""));
}

#[tokio::test]
async fn test_transcript_missing_time_is_bad_request() {
    let app = create_router(Arc::new(AppState::new(test_config(
        "http://127.0.0.1:1".to_string(),
    ))));

    let response = app
        .oneshot(
            Request::get("/transcript/vid123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transcript_blank_video_id_is_bad_request() {
    let app = create_router(Arc::new(AppState::new(test_config(
        "http://127.0.0.1:1".to_string(),
    ))));

    let response = app
        .oneshot(
            Request::get("/transcript/%20?t=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transcript_no_captions_literal() {
    let base = start_captionless_youtube().await;
    let app = create_router(Arc::new(AppState::new(test_config(base))));

    let response = app
        .oneshot(
            Request::get("/transcript/plainvideo?t=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "No transcript available.");
}

#[tokio::test]
async fn test_transcript_unreachable_upstream_error_literal() {
    // Nothing listens on this port; the watch-page fetch fails outright.
    let app = create_router(Arc::new(AppState::new(test_config(
        "http://127.0.0.1:9".to_string(),
    ))));

    let response = app
        .oneshot(
            Request::get("/transcript/vid123?t=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Error fetching transcript.");
}

#[tokio::test]
async fn test_annotate_without_key_is_unavailable() {
    let app = create_router(Arc::new(AppState::new(test_config(
        "http://127.0.0.1:1".to_string(),
    ))));

    let response = app
        .oneshot(
            Request::post("/annotate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"video_id":"vid123","time_secs":65.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_annotate_skips_upstream_for_captionless_video() {
    let base = start_captionless_youtube().await;
    let mut config = test_config(base);
    // Key present but the annotation API is never reached.
    config.openai_api_key = Some("sk-test".to_string());
    config.openai_endpoint = Some("http://127.0.0.1:9/v1/chat/completions".to_string());
    let app = create_router(Arc::new(AppState::new(config)));

    let response = app
        .oneshot(
            Request::post("/annotate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"video_id":"plainvideo","time_secs":65.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["paused_at"], "00:01:05");
    assert_eq!(body["annotation"]["transcript"], "No transcript available.");
    assert_eq!(body["annotation"]["questions"], serde_json::json!([]));
}

/// Full pipeline: stub watch page, stub timed-text, stub annotation API.
#[tokio::test]
async fn test_transcript_prefetch_annotate_pipeline() {
    // Stub YouTube whose watch page points at its own /timedtext route.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let track_url = format!("http://{addr}/timedtext");
    let page = watch_page(&track_url);
    let yt = Router::new()
        .route(
            "/watch",
            get(move || {
                let page = page.clone();
                async move { Html(page) }
            }),
        )
        .route("/timedtext", get(|| async { TIMED_TEXT }));
    tokio::spawn(async move {
        axum::serve(listener, yt).await.unwrap();
    });

    // Stub annotation API echoing a canned completion.
    let openai_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let openai_addr = openai_listener.local_addr().unwrap();
    let openai = Router::new().route(
        "/v1/chat/completions",
        post(|Json(_body): Json<serde_json::Value>| async {
            Json(serde_json::json!({
                "choices": [{"message": {"role": "assistant",
                    "content": "{\"transcript\":\"a b.\",\"keywords\":{},\"questions\":[\"why?\"]}"}}]
            }))
            .into_response()
        }),
    );
    tokio::spawn(async move {
        axum::serve(openai_listener, openai).await.unwrap();
    });

    let mut config = test_config(format!("http://{addr}"));
    config.openai_api_key = Some("sk-test".to_string());
    config.openai_endpoint = Some(format!("http://{openai_addr}/v1/chat/completions"));
    let app = create_router(Arc::new(AppState::new(config)));

    // Prefetch warms the cache
    let response = app
        .clone()
        .oneshot(
            Request::post("/transcript/vid123/prefetch")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"cached":true}"#);

    // Windowed transcript is served
    let response = app
        .clone()
        .oneshot(
            Request::get("/transcript/vid123?t=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "a b");

    // Cache stats reflect the stored transcript
    let response = app
        .clone()
        .oneshot(Request::get("/cache/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let stats: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(stats["video_count"], 1);
    assert_eq!(stats["entry_count"], 3);

    // Annotation round-trips through the stub API
    let response = app
        .clone()
        .oneshot(
            Request::post("/annotate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"video_id":"vid123","time_secs":10.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["paused_at"], "00:00:10");
    assert_eq!(body["annotation"]["questions"][0], "why?");

    // Metrics saw the traffic
    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let metrics = body_string(response).await;
    assert!(metrics.contains("transcript_requests_total"));
    assert!(metrics.contains("transcript_annotations_total 1"));
}
