//! Source B: Piped-style `/streams/{id}` endpoint

use super::{fetch_json, text_or};
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
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

pub struct PipedSource {
    client: Client,
    base_url: String,
    sort: QualitySort,
}

impl PipedSource {
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
struct PipedVideo {
    title: Option<String>,
    uploader: Option<String>,
    description: Option<String>,
    thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    duration: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    views: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    tags: Vec<String>,
    /// Mixed list, partitioned by quality and dimensions
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    streams: Vec<PipedStream>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    video_streams: Vec<PipedStream>,
    #[serde(default, deserialize_with = "deserialize_lenient_vec")]
    audio_streams: Vec<PipedStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedStream {
    url: Option<String>,
    quality: Option<String>,
    mime_type: Option<String>,
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
    video_only: Option<bool>,
}

impl PipedStream {
    fn to_raw(&self) -> RawStream {
        let audio_channels = self
            .audio_channels
            .map(|c| c as u32)
            .or_else(|| self.video_only.filter(|v| *v).map(|_| 0));

        RawStream {
            url: self.url.clone(),
            quality: self.quality.clone(),
            mime_type: self.mime_type.clone(),
            width: self.width.map(|w| w as u32),
            height: self.height.map(|h| h as u32),
            bitrate: self.bitrate,
            fps: self.fps.map(|f| f as u32),
            audio_channels,
        }
    }

    /// Entries of `audioStreams` carry labels like "128 kbps"; they are
    /// audio-only regardless, so the label is dropped before partitioning.
    fn to_raw_audio(&self) -> RawStream {
        RawStream {
            quality: None,
            ..self.to_raw()
        }
    }
}

impl PipedVideo {
    fn into_metadata(self, id: &VideoId, sort: QualitySort) -> VideoMetadata {
        let seconds = self.duration.unwrap_or(0);
        let duration = format_duration(seconds);
        let view_count = format_view_count(self.views.unwrap_or(0));
        debug!("piped duration {} views {}", duration, view_count);

        let streams: Vec<RawStream> = self
            .streams
            .iter()
            .chain(self.video_streams.iter())
            .map(PipedStream::to_raw)
            .chain(self.audio_streams.iter().map(PipedStream::to_raw_audio))
            .collect();

        VideoMetadata {
            id: id.clone(),
            title: text_or(self.title, UNTITLED),
            channel: text_or(self.uploader.clone(), UNKNOWN_CHANNEL),
            author_name: text_or(self.uploader, UNKNOWN_AUTHOR),
            description: text_or(self.description, NO_DESCRIPTION),
            thumbnail_url: self
                .thumbnail_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| id.thumbnail_url()),
            duration,
            view_count,
            formats: derive_formats(&streams, seconds, id, sort),
            tags: normalize_tags(&self.tags),
        }
    }
}

#[async_trait]
impl MetadataSource for PipedSource {
    fn id(&self) -> &'static str {
        "piped"
    }

    async fn attempt(&self, id: &VideoId) -> Result<VideoMetadata, NebulaError> {
        let url = format!("{}/streams/{}", self.base_url, id);
        info!("Querying Piped: {}", url);

        let request = self.client.get(&url).header(ACCEPT, "application/json");
        let video: PipedVideo = fetch_json(request, self.id()).await?;
        Ok(video.into_metadata(id, self.sort))
    }
}
