//! Transcript orchestration.
//!
//! Composes the locator, the timed-text fetcher, the windower, and the
//! cache behind one cache-first operation. Failures never cross this
//! boundary: they are logged and collapsed into the two literal strings
//! the presentation layer renders verbatim.

use crate::cache::{CacheConfig, TranscriptCache};
use crate::error::{Result, TranscriptError};
use crate::fetch::{HttpPageFetcher, PageFetcher, DEFAULT_WATCH_BASE};
use crate::locator;
use crate::timedtext;
use crate::types::{FetchState, TranscriptEntry};
use crate::window::window_text;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Rendered when a video legitimately has no captions. Part of the wire
/// contract with overlay consumers; do not reword.
pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available.";

/// Rendered when fetching or parsing failed. Same contract as above.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching transcript.";

/// `None` inside the cell means the video has no captions.
type FetchCell = Arc<OnceCell<Option<Arc<Vec<TranscriptEntry>>>>>;

/// Cache-first transcript service, safe to share across tasks.
pub struct TranscriptService {
    fetcher: Arc<dyn PageFetcher>,
    watch_base: String,
    cache: TranscriptCache,
    /// One cell per video id with a fetch in flight; concurrent requests
    /// for the same video join the existing fetch instead of racing it.
    in_flight: DashMap<String, FetchCell>,
}

impl TranscriptService {
    /// Production service talking to the public site.
    pub fn new(cache_config: CacheConfig) -> Self {
        Self::with_fetcher(
            Arc::new(HttpPageFetcher::new()),
            DEFAULT_WATCH_BASE,
            cache_config,
        )
    }

    /// Service with an injected fetcher and watch-page base URL.
    pub fn with_fetcher(
        fetcher: Arc<dyn PageFetcher>,
        watch_base: impl Into<String>,
        cache_config: CacheConfig,
    ) -> Self {
        Self::with_cache(fetcher, watch_base, TranscriptCache::new(cache_config))
    }

    /// Service with a fully constructed cache (e.g. one with a mock clock).
    pub fn with_cache(
        fetcher: Arc<dyn PageFetcher>,
        watch_base: impl Into<String>,
        cache: TranscriptCache,
    ) -> Self {
        Self {
            fetcher,
            watch_base: watch_base.into(),
            cache,
            in_flight: DashMap::new(),
        }
    }

    /// The transcript text around `current_time` for a video.
    ///
    /// Fast path: a cache hit returns without touching the network. On a
    /// miss the full transcript is fetched (joining any fetch already in
    /// flight for the same video), cached, and windowed. Never fails; the
    /// error kind is logged and one of the two literal strings comes back.
    pub async fn transcript_window(&self, video_id: &str, current_time: f64) -> String {
        if let Some(text) = self.cached_window(video_id, current_time) {
            return text;
        }

        match self.fetch_and_cache(video_id).await {
            Ok(Some(entries)) => window_text(&entries, current_time),
            Ok(None) => {
                tracing::info!(video_id, "no caption tracks available");
                NO_TRANSCRIPT_MESSAGE.to_string()
            }
            Err(err) => {
                tracing::warn!(video_id, error = %err, "transcript fetch failed");
                FETCH_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Cache-only lookup; `None` on any miss. This is the probe overlay
    /// consumers run before deciding to show a loading state.
    pub fn cached_window(&self, video_id: &str, current_time: f64) -> Option<String> {
        let text = self.cache.get(video_id, current_time)?;
        tracing::debug!(video_id, current_time, "transcript cache hit");
        Some(text)
    }

    /// Warm the cache for a video without windowing, as the original did on
    /// every watch-page navigation. Returns whether a transcript is cached
    /// afterwards; failures are logged and read as `false`.
    pub async fn prefetch(&self, video_id: &str) -> bool {
        if self.cache.contains(video_id) {
            return true;
        }
        match self.fetch_and_cache(video_id).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::info!(video_id, "no caption tracks available");
                false
            }
            Err(err) => {
                tracing::warn!(video_id, error = %err, "transcript prefetch failed");
                false
            }
        }
    }

    /// Where the per-video state machine currently sits.
    pub fn state(&self, video_id: &str) -> FetchState {
        if let Some(cell) = self.in_flight.get(video_id) {
            if cell.get().is_none() {
                return FetchState::Fetching;
            }
        }
        if self.cache.contains(video_id) {
            FetchState::Ready
        } else {
            FetchState::Idle
        }
    }

    /// The cache, for stats endpoints and background sweeps.
    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    /// Fetch the full transcript, deduplicating against any in-flight fetch
    /// for the same video. The cache is written inside the winning fetch,
    /// so a failure leaves prior cache contents untouched.
    async fn fetch_and_cache(&self, video_id: &str) -> Result<Option<Arc<Vec<TranscriptEntry>>>> {
        let cell: FetchCell = self
            .in_flight
            .entry(video_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_try_init(|| async {
                let fetched = self.fetch_full_transcript(video_id).await?;
                let shared = fetched.map(Arc::new);
                if let Some(entries) = &shared {
                    self.cache.insert(video_id, Arc::clone(entries));
                }
                Ok::<_, TranscriptError>(shared)
            })
            .await
            .map(Clone::clone);

        // Resolved either way; later requests go through the cache.
        self.in_flight.remove(video_id);
        result
    }

    /// Locate-then-fetch pipeline. `Ok(None)` means the video legitimately
    /// has no captions; errors are transport or parse failures.
    async fn fetch_full_transcript(&self, video_id: &str) -> Result<Option<Vec<TranscriptEntry>>> {
        let tracks =
            match locator::locate_tracks(self.fetcher.as_ref(), &self.watch_base, video_id).await {
                Ok(tracks) => tracks,
                Err(err) if err.is_no_captions() => return Ok(None),
                Err(err) => return Err(err),
            };

        let Some(track) = tracks.first() else {
            return Ok(None);
        };

        tracing::info!(video_id, language = %track.language, "fetching caption track");
        let entries = timedtext::fetch_track(self.fetcher.as_ref(), track).await?;
        Ok(Some(entries))
    }
}
