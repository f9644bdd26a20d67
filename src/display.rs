//! Text rendering of resolved videos for the terminal

use crate::extractor::{Format, Resolution, VideoMetadata};
use std::fmt::Write;

pub const SYNTHETIC_WARNING: &str =
    "Could not reach any metadata source; showing placeholder details and generic formats.";

/// Header block: title, channel, duration, views and tags
pub fn render_header(metadata: &VideoMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", metadata.title);
    let _ = writeln!(
        out,
        "{} | {} | {} views",
        metadata.channel, metadata.duration, metadata.view_count
    );
    if !metadata.tags.is_empty() {
        let tags: Vec<String> = metadata.tags.iter().map(|t| format!("#{}", t)).collect();
        let _ = writeln!(out, "{}", tags.join(" "));
    }
    out
}

/// What a format carries, as shown in the table
pub fn stream_label(format: &Format) -> &'static str {
    match (format.has_video, format.has_audio) {
        (true, true) => "video+audio",
        (true, false) => "video only",
        (false, true) => "audio",
        (false, false) => "-",
    }
}

/// Numbered table of formats
pub fn render_formats(formats: &[Format]) -> String {
    let mut out = String::new();
    if formats.is_empty() {
        out.push_str("No formats available.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>3}  {:<14} {:<6} {:<10} {:>4}  {}",
        "#", "QUALITY", "TYPE", "SIZE", "FPS", "STREAMS"
    );
    for (index, format) in formats.iter().enumerate() {
        let fps = if format.fps > 0 {
            format.fps.to_string()
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:<6} {:<10} {:>4}  {}",
            index + 1,
            format.quality,
            format.format.to_uppercase(),
            format.size,
            fps,
            stream_label(format)
        );
    }
    out
}

/// Full results view for one resolution
pub fn render_resolution(resolution: &Resolution) -> String {
    let mut out = render_header(&resolution.metadata);
    let _ = writeln!(out, "Source: {}", resolution.origin);
    out.push('\n');
    out.push_str(&render_formats(&resolution.metadata.formats));
    out
}

/// Pick a format by quality label (case-insensitive) or 1-based table index
pub fn select_format<'a>(formats: &'a [Format], choice: &str) -> Option<&'a Format> {
    let choice = choice.trim();
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 {
            if let Some(format) = formats.get(index - 1) {
                return Some(format);
            }
        }
    }
    formats
        .iter()
        .find(|f| f.quality.eq_ignore_ascii_case(choice))
}
