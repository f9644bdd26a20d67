//! HTTP-backed metadata sources
//!
//! Three public mirrors are supported: an Invidious-style video-detail API,
//! a Piped-style stream-detail API and the oEmbed endpoint. They share the
//! request plumbing below and normalize into [`VideoMetadata`].
//!
//! [`VideoMetadata`]: crate::extractor::models::VideoMetadata

pub mod invidious;
pub mod oembed;
pub mod piped;

pub use invidious::InvidiousSource;
pub use oembed::OEmbedSource;
pub use piped::PipedSource;

use crate::extractor::traits::MetadataSource;
use crate::utils::config::{AppSettings, SourceKind};
use crate::utils::error::NebulaError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

pub(crate) const UNTITLED: &str = "Untitled Video";
pub(crate) const UNKNOWN_CHANNEL: &str = "Unknown Channel";
pub(crate) const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub(crate) const NO_DESCRIPTION: &str = "No description available";

/// Build the shared HTTP client from settings
pub fn build_client(settings: &AppSettings) -> Result<Client, NebulaError> {
    let mut builder = Client::builder().user_agent(settings.user_agent.clone());
    if let Some(timeout) = settings.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Instantiate the configured sources in priority order
pub fn build_sources(
    settings: &AppSettings,
    client: &Client,
) -> Vec<Arc<dyn MetadataSource>> {
    settings
        .source_order
        .iter()
        .map(|kind| -> Arc<dyn MetadataSource> {
            match kind {
                SourceKind::Invidious => Arc::new(InvidiousSource::new(
                    client.clone(),
                    &settings.invidious_url,
                    settings.quality_sort,
                )),
                SourceKind::Piped => Arc::new(PipedSource::new(
                    client.clone(),
                    &settings.piped_url,
                    settings.quality_sort,
                )),
                SourceKind::OEmbed => {
                    Arc::new(OEmbedSource::new(client.clone(), &settings.oembed_url))
                }
            }
        })
        .collect()
}

/// Send a request and decode a JSON body, treating non-2xx as failure.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    source_id: &'static str,
) -> Result<T, NebulaError> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} responded with {}", source_id, status);

    if !status.is_success() {
        return Err(NebulaError::SourceStatus {
            source_id,
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// A present, non-empty string or the default.
pub(crate) fn text_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a `WIDTHxHEIGHT` dimension string.
pub(crate) fn parse_dimensions(size: &str) -> Option<(u32, u32)> {
    let (w, h) = size.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_or() {
        assert_eq!(text_or(Some("Title".into()), UNTITLED), "Title");
        assert_eq!(text_or(Some(String::new()), UNTITLED), UNTITLED);
        assert_eq!(text_or(None, UNKNOWN_CHANNEL), UNKNOWN_CHANNEL);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_dimensions("640 x 360"), Some((640, 360)));
        assert_eq!(parse_dimensions("1080p"), None);
        assert_eq!(parse_dimensions("axb"), None);
    }

    #[test]
    fn test_build_sources_follows_configured_order() {
        let settings = AppSettings {
            source_order: vec![SourceKind::OEmbed, SourceKind::Piped],
            ..AppSettings::default()
        };
        let client = build_client(&settings).unwrap();
        let ids: Vec<_> = build_sources(&settings, &client)
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec!["oembed", "piped"]);
    }
}
