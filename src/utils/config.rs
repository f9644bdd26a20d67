//! Application configuration

use crate::utils::error::NebulaError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_INVIDIOUS_URL: &str = "https://invidious.io/api/v1";
pub const DEFAULT_PIPED_URL: &str = "https://pipedapi.kavin.rocks";
pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the Invidious-style video-detail API
    pub invidious_url: String,

    /// Base URL of the Piped-style stream-detail API
    pub piped_url: String,

    /// oEmbed endpoint
    pub oembed_url: String,

    /// Sources consulted by the resolver, in priority order
    pub source_order: Vec<SourceKind>,

    /// Per-request timeout in seconds (0 disables it)
    pub request_timeout_secs: u64,

    /// User-Agent sent to metadata sources
    pub user_agent: String,

    /// How format lists are ranked
    pub quality_sort: QualitySort,

    /// Download location
    pub download_location: PathBuf,

    /// Generative-text API base URL
    pub gemini_url: String,

    /// Generative-text model name
    pub gemini_model: String,

    /// API key for content analysis. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            invidious_url: DEFAULT_INVIDIOUS_URL.to_string(),
            piped_url: DEFAULT_PIPED_URL.to_string(),
            oembed_url: DEFAULT_OEMBED_URL.to_string(),
            source_order: vec![SourceKind::Invidious, SourceKind::Piped, SourceKind::OEmbed],
            request_timeout_secs: 15,
            user_agent: format!("nebulastream/{}", env!("CARGO_PKG_VERSION")),
            quality_sort: QualitySort::LeadingDigits,
            download_location: dirs::download_dir().unwrap_or_else(|| PathBuf::from("./downloads")),
            gemini_url: DEFAULT_GEMINI_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl AppSettings {
    /// Load settings from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, NebulaError> {
        let mut settings = match path {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let json = std::fs::read_to_string(path)?;
                serde_json::from_str::<AppSettings>(&json)?
            }
            None => AppSettings::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), NebulaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NEBULA_INVIDIOUS_URL") {
            self.invidious_url = url;
        }
        if let Some(url) = lookup("NEBULA_PIPED_URL") {
            self.piped_url = url;
        }
        if let Some(url) = lookup("NEBULA_OEMBED_URL") {
            self.oembed_url = url;
        }
        if let Some(secs) = lookup("NEBULA_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                NebulaError::ConfigError(format!("NEBULA_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        Ok(())
    }

    /// Request timeout, or `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Metadata providers the resolver knows how to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Invidious,
    Piped,
    OEmbed,
}

/// Format ranking strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySort {
    /// Leading integer of the label ("4K (2160p)" ranks as 4)
    #[default]
    LeadingDigits,
    /// Leading integer with a trailing `K` read as a line count ("4K" ranks as 2160)
    Resolution,
}

impl QualitySort {
    /// Get string representation for display
    pub fn as_str(&self) -> &'static str {
        match self {
            QualitySort::LeadingDigits => "Leading digits",
            QualitySort::Resolution => "Resolution",
        }
    }
}
