//! Source C: oEmbed metadata (title, author and thumbnail only)

use super::{fetch_json, text_or};
use super::{UNKNOWN_AUTHOR, UNKNOWN_CHANNEL, UNTITLED};
use crate::extractor::formats::fallback_formats;
use crate::extractor::models::{VideoId, VideoMetadata};
use crate::extractor::traits::MetadataSource;
use crate::utils::error::NebulaError;
use crate::utils::humanize::UNKNOWN_DURATION;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

const DESCRIPTION_UNAVAILABLE: &str = "Video description unavailable";

pub struct OEmbedSource {
    client: Client,
    endpoint: String,
}

impl OEmbedSource {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

impl OEmbedResponse {
    /// oEmbed carries no streams, counts or tags, so those stay at their defaults.
    fn into_metadata(self, id: &VideoId) -> VideoMetadata {
        VideoMetadata {
            id: id.clone(),
            title: text_or(self.title, UNTITLED),
            channel: text_or(self.author_name.clone(), UNKNOWN_CHANNEL),
            author_name: text_or(self.author_name, UNKNOWN_AUTHOR),
            description: DESCRIPTION_UNAVAILABLE.to_string(),
            thumbnail_url: self
                .thumbnail_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| id.thumbnail_url()),
            duration: UNKNOWN_DURATION.to_string(),
            view_count: "0".to_string(),
            formats: fallback_formats(id),
            tags: Vec::new(),
        }
    }
}

#[async_trait]
impl MetadataSource for OEmbedSource {
    fn id(&self) -> &'static str {
        "oembed"
    }

    async fn attempt(&self, id: &VideoId) -> Result<VideoMetadata, NebulaError> {
        info!("Querying oEmbed for {}", id);

        let watch_url = id.watch_url();
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")]);
        let response: OEmbedResponse = fetch_json(request, self.id()).await?;
        Ok(response.into_metadata(id))
    }
}
