//! Video identifier extraction from pasted URLs

use crate::extractor::models::VideoId;
use regex::Regex;

lazy_static::lazy_static! {
    // The greedy prefix makes the last marker in the string win.
    static ref VIDEO_URL: Regex =
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
            .expect("video URL pattern is valid");
}

/// Extract the 11-character identifier from a YouTube URL.
///
/// Accepts `watch?v=`, `&v=`, `youtu.be/`, `embed/`, `v/` and `u/<n>/` shapes.
/// Returns `None` when nothing matches or the captured segment is not exactly
/// 11 characters long.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let captures = VIDEO_URL.captures(input.trim())?;
    let token = captures.get(2)?.as_str();
    VideoId::new(token)
}
