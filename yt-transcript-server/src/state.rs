//! Application state management
//!
//! One `AppState` is shared across all handlers: the transcript service
//! (with its keyed cache), the optional annotation client, metrics, and
//! the resolved configuration.

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::openai::OpenAiClient;
use std::sync::Arc;
use yt_transcript_lib::{HttpPageFetcher, TranscriptService};

/// Application state shared across all handlers
pub struct AppState {
    /// Cache-first transcript service
    pub service: TranscriptService,

    /// Annotation client; `None` when no API key is configured
    pub openai: Option<OpenAiClient>,

    /// Request/cache counters
    pub metrics: Metrics,

    /// Resolved configuration
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: AppConfig) -> Self {
        let service = TranscriptService::with_fetcher(
            Arc::new(HttpPageFetcher::new()),
            config.youtube_url.clone(),
            config.cache.clone(),
        );
        Self::with_service(config, service)
    }

    /// Create AppState around an existing service (tests inject stubbed
    /// fetchers this way)
    pub fn with_service(config: AppConfig, service: TranscriptService) -> Self {
        let openai = config.openai_api_key.as_ref().map(|key| {
            match &config.openai_endpoint {
                Some(endpoint) => OpenAiClient::with_endpoint(key, endpoint),
                None => OpenAiClient::new(key),
            }
        });
        Self {
            service,
            openai,
            metrics: Metrics::new(),
            config,
        }
    }
}
