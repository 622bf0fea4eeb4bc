//! HTTP fetch layer for watch pages and caption tracks.

use crate::error::{Result, TranscriptError};
use async_trait::async_trait;

/// Base URL of the site whose watch pages are scraped. Overridable so the
/// service can be pointed at a proxy or a local stub.
pub const DEFAULT_WATCH_BASE: &str = "https://www.youtube.com";

/// Build the public watch-page URL for a video id.
pub fn watch_url(base: &str, video_id: &str) -> String {
    format!(
        "{}/watch?v={}",
        base.trim_end_matches('/'),
        urlencoding::encode(video_id)
    )
}

/// Seam between the transcript pipeline and the network.
///
/// The pipeline only ever needs "GET this URL, give me the body as text";
/// everything else (markup extraction, windowing, caching) is pure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return the response body as text.
    ///
    /// Implementations must map non-success statuses to
    /// [`TranscriptError::PageFetch`] rather than returning error pages.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Production fetcher backed by a shared `reqwest` client.
///
/// No timeout is applied and redirects follow the client default; fetches
/// suspend only at the network boundary.
#[derive(Clone, Default)]
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Share an existing client (cloning `reqwest::Client` is cheap).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::PageFetch {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}
