//! Data structures for video information

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of tags kept on a record
pub const MAX_TAGS: usize = 15;

/// Tags must be shorter than this many characters
pub const MAX_TAG_LEN: usize = 50;

/// An 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Wrap a token, rejecting anything that is not exactly 11 characters
    pub fn new(token: &str) -> Option<Self> {
        Self::try_from(token.to_string()).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// Thumbnail derived from the identifier alone
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        if token.chars().count() == Self::LEN {
            Ok(Self(token))
        } else {
            Err(format!(
                "video id must be {} characters, got {:?}",
                Self::LEN,
                token
            ))
        }
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video information structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: VideoId,
    pub title: String,
    pub channel: String,
    pub author_name: String,
    pub description: String,
    pub thumbnail_url: String,
    /// `H:MM:SS`, `M:SS` or `00:00` when unknown
    pub duration: String,
    /// View count with K/M/B suffix
    pub view_count: String,
    pub formats: Vec<Format>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One candidate downloadable rendition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub quality: String,
    /// Container label, e.g. `mp4`, `webm`, `mp3`
    pub format: String,
    pub size: String,
    pub fps: u32,
    pub url: String,
    pub has_audio: bool,
    pub has_video: bool,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub real_size: Option<u64>,
}

impl Format {
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }
}

/// Where a resolved record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A metadata source answered; holds the source id
    Source(&'static str),
    /// Every source failed and the record was built from the identifier alone
    Synthetic,
}

impl Origin {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Origin::Synthetic)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Source(id) => f.write_str(id),
            Origin::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// Result of a resolver run
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub metadata: VideoMetadata,
    pub origin: Origin,
    pub resolved_at: DateTime<Utc>,
}

/// A stream entry as reported by a source, before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStream {
    pub url: Option<String>,
    pub quality: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bitrate: Option<u64>,
    pub fps: Option<u32>,
    pub audio_channels: Option<u32>,
}

/// Lower-case, trim and deduplicate tags, keeping first-seen order.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.as_ref();
        if tag.is_empty() || tag.chars().count() >= MAX_TAG_LEN {
            continue;
        }
        let normalized = tag.trim().to_lowercase();
        if normalized.is_empty() || tags.contains(&normalized) {
            continue;
        }
        tags.push(normalized);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}
