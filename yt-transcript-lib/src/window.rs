//! Transcript windowing.

use crate::types::TranscriptEntry;

/// Half-width of the transcript window around the playback time, in seconds.
pub const WINDOW_RADIUS_SECS: f64 = 10.0;

/// Join the text of the entries near `current_time`, in source order.
///
/// The window is `[max(0, t - 10), t + 10]`, inclusive on both ends. An
/// entry is selected by its start time alone; its duration does not widen
/// the boundary test. That matches the behavior overlay consumers were
/// built against and is kept for compatibility.
///
/// Returns an empty string when nothing overlaps, which callers must keep
/// distinct from "no transcript available".
pub fn window_text(entries: &[TranscriptEntry], current_time: f64) -> String {
    let lower = (current_time - WINDOW_RADIUS_SECS).max(0.0);
    let upper = current_time + WINDOW_RADIUS_SECS;

    let mut parts = Vec::new();
    for entry in entries {
        if entry.start_secs >= lower && entry.start_secs <= upper {
            parts.push(entry.text.as_str());
        }
    }
    parts.join(" ")
}

/// Format a second count as HH:MM:SS, flooring fractional seconds.
pub fn format_timestamp(total_secs: f64) -> String {
    let total = total_secs.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
