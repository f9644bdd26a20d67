use crate::analysis::AnalysisKind;
use crate::downloader::TransferState;
use crate::extractor::{Format, Resolution, VideoMetadata};
use std::path::PathBuf;

/// Commands sent from the front end to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Look up a pasted URL. Supersedes any lookup still in flight.
    Resolve {
        url: String,
    },
    Download {
        metadata: VideoMetadata,
        format: Format,
        out_dir: PathBuf,
    },
    Analyze {
        metadata: VideoMetadata,
        kind: AnalysisKind,
    },
    // System
    Shutdown,
}

/// Events sent from the backend to the front end
#[derive(Debug, Clone)]
pub enum BackendEvent {
    // Resolution
    ResolutionStarted {
        request: u64,
    },
    ResolutionCompleted {
        request: u64,
        result: Result<Resolution, String>,
    },

    // Download life-cycle
    Transfer {
        state: TransferState,
        status: String,
    },
    DownloadSaved(PathBuf),

    // Analysis
    AnalysisCompleted {
        kind: AnalysisKind,
        result: Result<String, String>,
    },

    // System
    Error(String),
}
