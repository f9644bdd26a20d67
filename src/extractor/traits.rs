use crate::extractor::models::{VideoId, VideoMetadata};
use crate::utils::error::NebulaError;
use async_trait::async_trait;

/// Core trait for all metadata sources
///
/// Each implementation wraps one external API. The resolver tries them in
/// priority order and keeps the first success, so an implementation must map
/// transport errors, undecodable bodies and non-2xx statuses to `Err` rather
/// than returning partial data.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g., "invidious", "oembed")
    fn id(&self) -> &'static str;

    /// Fetch and normalize metadata for one video
    async fn attempt(&self, id: &VideoId) -> Result<VideoMetadata, NebulaError>;
}
