//! Application wiring shared by every front end

use crate::analysis::AnalysisClient;
use crate::backend::{BackendActor, BackendCommand, BackendEvent};
use crate::downloader::{DownloadConfig, DownloadEngine};
use crate::extractor::sources::build_client;
use crate::extractor::MetadataResolver;
use crate::utils::config::AppSettings;
use crate::utils::error::NebulaError;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Configured components built once from [`AppSettings`]
pub struct App {
    pub settings: AppSettings,
    pub resolver: Arc<MetadataResolver>,
    pub engine: Arc<DownloadEngine>,
    pub analysis: Arc<AnalysisClient>,
}

impl App {
    pub fn new(settings: AppSettings) -> Result<Self, NebulaError> {
        let client = build_client(&settings)?;
        let resolver = MetadataResolver::from_settings(&settings)?;
        let engine = DownloadEngine::with_client(client.clone(), DownloadConfig::default());
        let analysis = AnalysisClient::from_settings(&settings, client);

        info!(
            "Sources: {:?}, quality sort: {}",
            resolver.source_ids(),
            settings.quality_sort.as_str()
        );

        Ok(Self {
            settings,
            resolver: Arc::new(resolver),
            engine: Arc::new(engine),
            analysis: Arc::new(analysis),
        })
    }

    /// Start a backend actor over these components
    pub fn spawn_backend(
        &self,
    ) -> (
        mpsc::Sender<BackendCommand>,
        mpsc::Receiver<BackendEvent>,
        JoinHandle<()>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(100);
        let actor = BackendActor::with_components(
            self.resolver.clone(),
            self.engine.clone(),
            self.analysis.clone(),
            cmd_rx,
            event_tx,
        );
        let handle = tokio::spawn(actor.run());
        (cmd_tx, event_rx, handle)
    }
}
