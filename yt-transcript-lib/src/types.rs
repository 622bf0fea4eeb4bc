use serde::Deserialize;

/// A single language variant of a video's caption data
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    /// Display name as shown by the player ("English", "English (auto-generated)", ...)
    pub language: String,
    /// Fetch URL for the track's timed-text document
    pub url: String,
}

/// One caption line with its timing
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    /// Offset of the line from the start of the video, in seconds
    pub start_secs: f64,
    /// How long the line stays on screen, in seconds
    pub duration_secs: f64,
    /// Decoded text content of the line
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(start_secs: f64, duration_secs: f64, text: impl Into<String>) -> Self {
        Self {
            start_secs,
            duration_secs,
            text: text.into(),
        }
    }
}

/// Per-video fetch lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing fetched and nothing in flight
    Idle,
    /// A fetch for this video is currently in flight
    Fetching,
    /// A full transcript for this video is cached
    Ready,
}

// Wire types for the player caption payload embedded in the watch page.
// Unknown sibling fields are ignored; everything here is optional because
// the payload is undocumented and has changed shape before.

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionsRenderer {
    #[serde(rename = "playerCaptionsTracklistRenderer", default)]
    pub tracklist: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    pub caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(default)]
    pub name: Option<TrackName>,
    #[serde(rename = "languageCode", default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackName {
    #[serde(rename = "simpleText", default)]
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextRun {
    #[serde(default)]
    pub text: String,
}

impl RawCaptionTrack {
    /// Display name for the track: `name.simpleText`, newer `name.runs`
    /// payloads, or the bare language code as a last resort.
    pub(crate) fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            if let Some(simple) = &name.simple_text {
                return simple.clone();
            }
            if let Some(runs) = &name.runs {
                let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
                if !joined.is_empty() {
                    return joined;
                }
            }
        }
        self.language_code.clone().unwrap_or_default()
    }
}
