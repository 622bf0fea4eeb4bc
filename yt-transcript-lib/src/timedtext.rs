//! Timed-text parsing.
//!
//! A caption track resolves to a small XML document with one `<text>` node
//! per spoken line, carrying `start` and `dur` attributes in seconds:
//!
//! ```text
//! <transcript>
//!   <text start="1.04" dur="2.32">so today we&amp;#39;re looking at</text>
//!   ...
//! </transcript>
//! ```

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::types::{CaptionTrack, TranscriptEntry};

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Download a caption track and parse it into ordered transcript entries.
///
/// An empty result means the track itself is empty; network failures
/// propagate, with no retry at this layer.
pub async fn fetch_track(
    fetcher: &dyn PageFetcher,
    track: &CaptionTrack,
) -> Result<Vec<TranscriptEntry>> {
    let xml = fetcher.fetch_text(&track.url).await?;
    Ok(parse_timed_text(&xml))
}

/// Parse timed-text markup into entries, preserving source order.
///
/// Nodes without a usable `start` attribute are skipped; a missing `dur`
/// defaults to zero. Inline markup inside the node text is stripped and
/// entity escapes are decoded.
pub fn parse_timed_text(xml: &str) -> Vec<TranscriptEntry> {
    let node_re = regex!(r#"(?s)<text([^>]*)>(.*?)</text>"#);
    let start_re = regex!(r#"start="([^"]*)""#);
    let dur_re = regex!(r#"dur="([^"]*)""#);
    let tag_re = regex!(r"<[^>]*>");

    let mut entries = Vec::new();
    for caps in node_re.captures_iter(xml) {
        let attrs = &caps[1];
        let start_secs = match start_re
            .captures(attrs)
            .and_then(|c| c[1].parse::<f64>().ok())
        {
            Some(v) => v,
            None => continue,
        };
        let duration_secs = dur_re
            .captures(attrs)
            .and_then(|c| c[1].parse::<f64>().ok())
            .unwrap_or(0.0);

        let stripped = tag_re.replace_all(&caps[2], "");
        let text = decode_entities(&stripped);
        entries.push(TranscriptEntry {
            start_secs,
            duration_secs,
            text,
        });
    }
    entries
}

/// Decode the entity escapes the timed-text format uses: the named XML five
/// plus decimal and hex character references. Unknown or malformed
/// sequences pass through literally.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let decoded = match &rest[1..end] {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            entity => {
                if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok().and_then(char::from_u32)
                } else {
                    None
                }
            }
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
