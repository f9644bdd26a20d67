//! Error handling for NebulaStream

use thiserror::Error;

/// Main error type for NebulaStream
#[derive(Debug, Error)]
pub enum NebulaError {
    #[error("Invalid YouTube URL. Please check the link and try again: {0}")]
    InvalidUrl(String),

    #[error("{source_id} responded with HTTP {status}")]
    SourceStatus { source_id: &'static str, status: u16 },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API Key is missing. Please configure your environment.")]
    MissingApiKey,

    #[error("Failed to analyze video content: {0}")]
    AnalysisFailed(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request was superseded before it completed")]
    Cancelled,
}

impl NebulaError {
    /// Message shown inline to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            NebulaError::InvalidUrl(_) => {
                "Please enter a valid YouTube URL (e.g., youtube.com/watch?v=... or youtu.be/...)"
                    .to_string()
            }
            NebulaError::MissingApiKey => self.to_string(),
            NebulaError::AnalysisFailed(_) => {
                "Failed to analyze video content. Please try again.".to_string()
            }
            NebulaError::DownloadError(_) => "Error".to_string(),
            _ => "An unexpected connection error occurred. Please try again.".to_string(),
        }
    }
}
