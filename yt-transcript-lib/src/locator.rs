//! Caption track discovery.
//!
//! YouTube embeds the player caption metadata as a `"captions":{...}` object
//! inline in the watch-page HTML, with no closing delimiter to search for.
//! Extraction anchors on the field name and walks the object with a
//! bracket-depth scan. The anchor is an undocumented field in an unversioned
//! payload; when the upstream markup changes, discovery degrades to
//! `NoCaptions` or `Parse` instead of panicking, and that is the accepted
//! failure mode.

use crate::error::{Result, TranscriptError};
use crate::fetch::{watch_url, PageFetcher};
use crate::types::{CaptionTrack, CaptionsRenderer};

/// Field name the caption payload is anchored on.
const CAPTIONS_ANCHOR: &str = "\"captions\":";

/// Preferred language, ranked first in the returned track list.
const ENGLISH: &str = "English";

/// Fetch the watch page for `video_id` and return its caption tracks,
/// English-named tracks first.
///
/// An empty vector means the player metadata is present but lists no
/// tracks; that is a normal outcome, not an error. A page without any
/// caption metadata at all yields [`TranscriptError::NoCaptions`].
pub async fn locate_tracks(
    fetcher: &dyn PageFetcher,
    watch_base: &str,
    video_id: &str,
) -> Result<Vec<CaptionTrack>> {
    let url = watch_url(watch_base, video_id);
    let html = fetcher.fetch_text(&url).await?;
    extract_caption_tracks(&html, video_id)
}

/// Pull the caption track list out of raw watch-page HTML.
pub fn extract_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrack>> {
    let anchor = html
        .find(CAPTIONS_ANCHOR)
        .ok_or_else(|| TranscriptError::NoCaptions(video_id.to_string()))?;
    let tail = &html[anchor + CAPTIONS_ANCHOR.len()..];
    let json = extract_json_object(tail).ok_or_else(|| {
        TranscriptError::Parse(format!(
            "unterminated captions object in watch page for video {video_id}"
        ))
    })?;

    let captions: CaptionsRenderer = serde_json::from_str(json)?;
    let mut tracks: Vec<CaptionTrack> = captions
        .tracklist
        .map(|t| t.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| CaptionTrack {
            language: raw.display_name(),
            url: raw.base_url,
        })
        .collect();

    sort_english_first(&mut tracks);
    Ok(tracks)
}

/// Slice the JSON object at the start of `input`, walking brace depth and
/// skipping over string literals (including escaped quotes).
///
/// Returns `None` when the input does not begin with an object or the
/// object never closes.
fn extract_json_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    if !input[..start].trim().is_empty() {
        // The anchor is followed by something other than an object
        // (e.g. `"captions":null`); refuse rather than scan garbage.
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in input[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rank for the English-first ordering: exact name, then substring, then
/// everything else.
fn english_rank(language: &str) -> u8 {
    if language == ENGLISH {
        0
    } else if language.contains(ENGLISH) {
        1
    } else {
        2
    }
}

/// Stable sort keeping source order within each rank.
fn sort_english_first(tracks: &mut [CaptionTrack]) {
    tracks.sort_by_key(|t| english_rank(&t.language));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    fn track(language: &str) -> CaptionTrack {
        CaptionTrack {
            language: language.to_string(),
            url: format!("https://example.test/{language}"),
        }
    }

    #[test]
    fn test_extract_json_object_nested() {
        let input = r#"{"a":{"b":[1,2,{"c":3}]},"d":"x"} trailing"#;
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"a":{"b":[1,2,{"c":3}]},"d":"x"}"#)
        );
    }

    #[test]
    fn test_extract_json_object_braces_in_strings() {
        let input = r#"{"title":"odd } brace and \" escaped quote {"}rest"#;
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"title":"odd } brace and \" escaped quote {"}"#)
        );
    }

    #[test]
    fn test_extract_json_object_unterminated() {
        assert_eq!(extract_json_object(r#"{"a":{"b":1}"#), None);
    }

    #[test]
    fn test_extract_json_object_not_an_object() {
        assert_eq!(extract_json_object(r#"null,"next":{}"#), None);
    }

    #[test]
    fn test_extract_tracks_from_fixture_page() {
        let html = fixtures::watch_page_html(&[
            ("Spanish", "https://example.test/tt?lang=es"),
            ("English", "https://example.test/tt?lang=en"),
            ("English (auto-generated)", "https://example.test/tt?lang=en-auto"),
        ]);
        let tracks = extract_caption_tracks(&html, "vid123").unwrap();
        let names: Vec<&str> = tracks.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(names, ["English", "English (auto-generated)", "Spanish"]);
        assert_eq!(tracks[0].url, "https://example.test/tt?lang=en");
    }

    #[test]
    fn test_missing_anchor_is_no_captions() {
        let err = extract_caption_tracks(fixtures::WATCH_PAGE_NO_CAPTIONS, "vid123").unwrap_err();
        assert!(err.is_no_captions(), "got {err:?}");
    }

    #[test]
    fn test_empty_track_list_is_ok() {
        let html = fixtures::watch_page_html(&[]);
        let tracks = extract_caption_tracks(&html, "vid123").unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_unterminated_payload_is_parse_error() {
        let html = r#"<html><script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"#;
        let err = extract_caption_tracks(html, "vid123").unwrap_err();
        assert!(matches!(err, TranscriptError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_sort_exact_english_before_partial() {
        let mut tracks = vec![track("Spanish"), track("English"), track("English (auto)")];
        sort_english_first(&mut tracks);
        let names: Vec<&str> = tracks.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(names, ["English", "English (auto)", "Spanish"]);
    }

    #[test]
    fn test_sort_is_stable_within_rank() {
        let mut tracks = vec![
            track("French"),
            track("English (UK)"),
            track("German"),
            track("English (US)"),
        ];
        sort_english_first(&mut tracks);
        let names: Vec<&str> = tracks.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(names, ["English (UK)", "English (US)", "French", "German"]);
    }
}
