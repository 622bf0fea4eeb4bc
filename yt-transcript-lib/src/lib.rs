//! Core library for locating, fetching, windowing, and caching YouTube
//! video transcripts.
//!
//! The pipeline scrapes the public watch page for caption-track metadata,
//! downloads the chosen track's timed-text XML, and answers "what was being
//! said around this playback time" as a single string. Scraping an
//! undocumented page payload is inherently fragile; see [`locator`] for the
//! accepted failure modes.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod locator;
pub mod service;
pub mod timedtext;
pub mod types;
pub mod window;

#[cfg(test)]
pub(crate) mod tests;

pub use cache::{CacheConfig, CacheMode, CacheStats, Clock, SystemClock, TranscriptCache};
pub use error::{Result, TranscriptError};
pub use fetch::{HttpPageFetcher, PageFetcher, DEFAULT_WATCH_BASE};
pub use service::{TranscriptService, FETCH_ERROR_MESSAGE, NO_TRANSCRIPT_MESSAGE};
pub use types::{CaptionTrack, FetchState, TranscriptEntry};
pub use window::{format_timestamp, window_text, WINDOW_RADIUS_SECS};
