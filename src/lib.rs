//! NebulaStream library

pub mod analysis;
pub mod app;
pub mod backend;
pub mod display;
pub mod downloader;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use analysis::{AnalysisClient, AnalysisKind};
pub use app::App;
pub use downloader::{DownloadConfig, DownloadEngine, TransferState, TransferTracker};
pub use extractor::{Format, MetadataResolver, Origin, Resolution, VideoId, VideoMetadata};
pub use utils::{AppSettings, NebulaError};
