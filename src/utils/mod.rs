//! Utility modules for error handling, configuration and display formatting

pub mod config;
pub mod error;
pub mod humanize;

// Re-export for convenience
pub use config::{AppSettings, QualitySort, SourceKind};
pub use error::NebulaError;
pub use humanize::{format_bytes, format_duration, format_view_count};
