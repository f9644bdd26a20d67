//! Source A: Invidious-style `/videos/{id}` endpoint

use super::{fetch_json, parse_dimensions, text_or};
use super::{NO_DESCRIPTION, UNKNOWN_AUTHOR, UNKNOWN_CHANNEL, UNTITLED};
use crate::extractor::formats::derive_formats;
use crate::extractor::models::{normalize_tags, RawStream, VideoId, VideoMetadata};
use crate::extractor::traits::MetadataSource;
use crate::utils::config::QualitySort;
use crate::utils::error::NebulaError;
use crate::utils::humanize::{
    deserialize_lenient_u64, deserialize_lenient_vec, format_duration, format_view_count,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

pub struct InvidiousSource {
    client: Client,
    base_url: String,
    sort: QualitySort,
}

impl InvidiousSource {
    pub fn new(client: Client, base_url: &str, sort: QualitySort) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sort,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousVideo {
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    video_thumbnails: Vec<InvidiousThumbnail>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    length_seconds: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    view_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec", alias = "keywords")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    format_streams: Vec<InvidiousStream>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    adaptive_formats: Vec<InvidiousStream>,
}

#[derive(Debug, Deserialize)]
struct InvidiousThumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousStream {
    url: Option<String>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
    quality_label: Option<String>,
    size: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    width: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    height: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    bitrate: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    fps: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    audio_channels: Option<u64>,
}

impl From<&InvidiousStream> for RawStream {
    fn from(stream: &InvidiousStream) -> Self {
        let dims = stream.size.as_deref().and_then(parse_dimensions);
        RawStream {
            url: stream.url.clone(),
            quality: stream.quality_label.clone(),
            mime_type: stream.mime_type.clone(),
            width: dims.map(|d| d.0).or(stream.width.map(|w| w as u32)),
            height: dims.map(|d| d.1).or(stream.height.map(|h| h as u32)),
            bitrate: stream.bitrate,
            fps: stream.fps.map(|f| f as u32),
            audio_channels: stream.audio_channels.map(|c| c as u32),
        }
    }
}

impl InvidiousVideo {
    fn into_metadata(self, id: &VideoId, sort: QualitySort) -> VideoMetadata {
        let seconds = self.length_seconds.unwrap_or(0);
        let duration = format_duration(seconds);
        let view_count = format_view_count(self.view_count.unwrap_or(0));
        debug!("invidious duration {} views {}", duration, view_count);

        let streams: Vec<RawStream> = self
            .format_streams
            .iter()
            .chain(self.adaptive_formats.iter())
            .map(RawStream::from)
            .collect();

        let thumbnail_url = self
            .video_thumbnails
            .last()
            .and_then(|t| t.url.clone())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| id.thumbnail_url());

        VideoMetadata {
            id: id.clone(),
            title: text_or(self.title, UNTITLED),
            channel: text_or(self.author.clone(), UNKNOWN_CHANNEL),
            author_name: text_or(self.author, UNKNOWN_AUTHOR),
            description: text_or(self.description, NO_DESCRIPTION),
            thumbnail_url,
            duration,
            view_count,
            formats: derive_formats(&streams, seconds, id, sort),
            tags: normalize_tags(&self.tags),
        }
    }
}

#[async_trait]
impl MetadataSource for InvidiousSource {
    fn id(&self) -> &'static str {
        "invidious"
    }

    async fn attempt(&self, id: &VideoId) -> Result<VideoMetadata, NebulaError> {
        let url = format!("{}/videos/{}", self.base_url, id);
        info!("Querying Invidious: {}", url);

        let video: InvidiousVideo = fetch_json(self.client.get(&url), self.id()).await?;
        Ok(video.into_metadata(id, self.sort))
    }
}
