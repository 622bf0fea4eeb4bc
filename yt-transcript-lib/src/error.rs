use thiserror::Error;

/// Main error type for transcript acquisition
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// A transport-level failure talking to YouTube
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-success HTTP status fetching the watch page or a caption track
    #[error("unexpected status {status} fetching {url}")]
    PageFetch {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The watch page carries no caption metadata at all
    #[error("no caption metadata in watch page for video {0}")]
    NoCaptions(String),

    /// The embedded caption structure could not be extracted from the page
    #[error("caption metadata parse error: {0}")]
    Parse(String),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscriptError {
    /// Whether this error means "the video has nothing to transcribe"
    /// rather than a failed attempt to find out.
    pub fn is_no_captions(&self) -> bool {
        matches!(self, TranscriptError::NoCaptions(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TranscriptError>;
