use crate::extractor::formats::fallback_formats;
use crate::extractor::models::{Origin, Resolution, VideoId, VideoMetadata};
use crate::extractor::sources::{build_client, build_sources};
use crate::extractor::traits::MetadataSource;
use crate::extractor::video_id::extract_video_id;
use crate::utils::config::AppSettings;
use crate::utils::error::NebulaError;
use crate::utils::humanize::UNKNOWN_DURATION;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The metadata resolver
///
/// Holds an ordered list of sources and returns the first successful answer.
/// When every source fails the caller still gets a record, built from the
/// identifier alone and flagged [`Origin::Synthetic`].
pub struct MetadataResolver {
    sources: Vec<Arc<dyn MetadataSource>>,
}

impl MetadataResolver {
    /// Create a resolver over the given sources, consulted in order
    pub fn new(sources: Vec<Arc<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    /// Build the configured Invidious/Piped/oEmbed chain
    pub fn from_settings(settings: &AppSettings) -> Result<Self, NebulaError> {
        let client = build_client(settings)?;
        Ok(Self::new(build_sources(settings, &client)))
    }

    /// Ids of the configured sources in priority order
    pub fn source_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Resolve a pasted URL
    pub async fn resolve(&self, url: &str) -> Result<Resolution, NebulaError> {
        self.resolve_with_cancel(url, &CancellationToken::new()).await
    }

    /// Resolve a pasted URL, giving up with [`NebulaError::Cancelled`] as soon
    /// as `cancel` fires. An in-flight request is dropped, not awaited.
    pub async fn resolve_with_cancel(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Resolution, NebulaError> {
        let id = extract_video_id(url)
            .ok_or_else(|| NebulaError::InvalidUrl(url.trim().to_string()))?;
        debug!("Resolving {} via {:?}", id, self.source_ids());

        for source in &self.sources {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(NebulaError::Cancelled),
                outcome = source.attempt(&id) => outcome,
            };

            match outcome {
                Ok(metadata) => {
                    info!("Resolved {} via {}", id, source.id());
                    return Ok(Resolution {
                        metadata,
                        origin: Origin::Source(source.id()),
                        resolved_at: Utc::now(),
                    });
                }
                Err(e) => {
                    warn!("Source {} failed for {}: {}", source.id(), id, e);
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(NebulaError::Cancelled);
        }

        warn!("All sources failed for {}, returning synthetic record", id);
        Ok(Resolution {
            metadata: synthetic_metadata(&id),
            origin: Origin::Synthetic,
            resolved_at: Utc::now(),
        })
    }
}

/// Placeholder record built from the identifier alone
pub fn synthetic_metadata(id: &VideoId) -> VideoMetadata {
    VideoMetadata {
        id: id.clone(),
        title: "YouTube Video".to_string(),
        channel: "Unknown Channel".to_string(),
        author_name: "Unknown Author".to_string(),
        description: "Unable to fetch video details. Please check the URL and try again."
            .to_string(),
        thumbnail_url: id.thumbnail_url(),
        duration: UNKNOWN_DURATION.to_string(),
        view_count: "0".to_string(),
        formats: fallback_formats(id),
        tags: Vec::new(),
    }
}
