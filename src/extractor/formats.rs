//! Format list derivation, ranking and the static fallback table

use crate::extractor::models::{Format, RawStream, VideoId};
use crate::utils::config::QualitySort;
use crate::utils::humanize::{estimate_bytes, estimate_file_size, leading_integer};
use tracing::debug;

const DEFAULT_VIDEO_FPS: u32 = 30;
const DEFAULT_AUDIO_BITRATE: u64 = 128_000;

/// Build the format list from a source's raw streams.
///
/// Streams with quality and dimensions become video entries, streams without a
/// quality become audio-only entries; anything else is dropped. An empty result
/// is replaced by [`fallback_formats`].
pub fn derive_formats(
    streams: &[RawStream],
    duration_secs: u64,
    id: &VideoId,
    sort: QualitySort,
) -> Vec<Format> {
    let mut formats = Vec::new();

    let video_streams = streams.iter().filter(|s| {
        s.quality.as_deref().is_some_and(|q| !q.is_empty())
            && s.width.is_some_and(|w| w > 0)
            && s.height.is_some_and(|h| h > 0)
    });

    for stream in video_streams {
        let Some(url) = stream.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        let bitrate = stream.bitrate.unwrap_or(0);

        formats.push(Format {
            quality: stream.quality.clone().unwrap_or_default(),
            format: container_from_mime(stream.mime_type.as_deref().unwrap_or("mp4"))
                .to_string(),
            size: estimate_file_size(bitrate, duration_secs),
            fps: stream.fps.filter(|f| *f > 0).unwrap_or(DEFAULT_VIDEO_FPS),
            url: url.to_string(),
            has_audio: stream.audio_channels.map_or(true, |c| c > 0),
            has_video: true,
            bitrate: Some(bitrate),
            real_size: estimate_bytes(bitrate, duration_secs),
        });
    }

    let audio_streams = streams
        .iter()
        .filter(|s| s.quality.as_deref().map_or(true, str::is_empty));

    for stream in audio_streams {
        let Some(url) = stream.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        let bitrate = stream.bitrate.filter(|b| *b > 0).unwrap_or(DEFAULT_AUDIO_BITRATE);

        formats.push(Format {
            quality: format!("{}kbps", (bitrate as f64 / 1000.0).round() as u64),
            format: container_from_mime(stream.mime_type.as_deref().unwrap_or("mp3"))
                .to_string(),
            size: estimate_file_size(bitrate, duration_secs),
            fps: 0,
            url: url.to_string(),
            has_audio: true,
            has_video: false,
            bitrate: Some(bitrate),
            real_size: estimate_bytes(bitrate, duration_secs),
        });
    }

    if formats.is_empty() {
        debug!("No usable streams for {}, using fallback formats", id);
        return fallback_formats(id);
    }

    sort_formats(&mut formats, sort);
    formats
}

/// Container label for a mime type.
pub fn container_from_mime(mime_type: &str) -> &'static str {
    if mime_type.contains("audio") {
        return if mime_type.contains("mp3") { "mp3" } else { "m4a" };
    }
    if mime_type.contains("webm") {
        return "webm";
    }
    "mp4"
}

/// Numeric rank of a quality label under the chosen strategy.
pub fn quality_rank(label: &str, sort: QualitySort) -> i64 {
    let Some(value) = leading_integer(label) else {
        return 0;
    };

    match sort {
        QualitySort::LeadingDigits => value,
        QualitySort::Resolution => {
            let rest = label
                .trim_start()
                .trim_start_matches(['-', '+'])
                .trim_start_matches(|c: char| c.is_ascii_digit());
            let mut chars = rest.chars();
            let k_marker = matches!(chars.next(), Some('K' | 'k'))
                && !chars.next().is_some_and(|c| c.is_ascii_alphabetic());

            match (k_marker, value) {
                (true, 2) => 1440,
                (true, v) => v.saturating_mul(540),
                (false, v) => v,
            }
        }
    }
}

/// Sort descending by rank. Ties keep their incoming order.
pub fn sort_formats(formats: &mut [Format], sort: QualitySort) {
    formats.sort_by_key(|f| std::cmp::Reverse(quality_rank(&f.quality, sort)));
}

/// The hand-authored table used when no source yields streams.
pub fn fallback_formats(id: &VideoId) -> Vec<Format> {
    let url = id.watch_url();
    let entry = |quality: &str, format: &str, size: &str, fps: u32, real_size: u64, bitrate: u64| {
        Format {
            quality: quality.to_string(),
            format: format.to_string(),
            size: size.to_string(),
            fps,
            url: url.clone(),
            has_audio: true,
            has_video: fps > 0,
            bitrate: Some(bitrate),
            real_size: Some(real_size),
        }
    };

    vec![
        entry("4K (2160p)", "mp4", "2.5 GB", 60, 2_684_354_560, 25_000),
        entry("1080p", "mp4", "850 MB", 60, 891_289_600, 8_000),
        entry("720p", "mp4", "450 MB", 30, 471_859_200, 5_000),
        entry("480p", "webm", "280 MB", 30, 293_601_280, 3_000),
        entry("320kbps", "mp3", "45 MB", 0, 47_185_920, 320),
        entry("128kbps", "mp3", "18 MB", 0, 18_874_368, 128),
    ]
}
