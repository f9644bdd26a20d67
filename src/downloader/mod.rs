//! Download engine module

pub mod engine;
pub mod progress;
pub mod simulator;

// Re-export for convenience
pub use engine::{download_filename, DownloadConfig, DownloadEngine};
pub use progress::{TransferEvent, TransferState, TransferTracker};
pub use simulator::ProgressSimulator;
