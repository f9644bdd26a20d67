use super::messages::{BackendCommand, BackendEvent};
use super::session::ResolveSession;
use crate::analysis::{AnalysisClient, AnalysisKind};
use crate::downloader::{DownloadEngine, TransferEvent, TransferTracker};
use crate::extractor::{Format, MetadataResolver, Resolution, VideoMetadata};
use crate::utils::error::NebulaError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

type Resolved = (u64, Result<Resolution, NebulaError>);

pub struct BackendActor {
    receiver: mpsc::Receiver<BackendCommand>,
    sender: mpsc::Sender<BackendEvent>,

    // Components
    resolver: Arc<MetadataResolver>,
    engine: Arc<DownloadEngine>,
    analysis: Arc<AnalysisClient>,

    session: ResolveSession,
}

impl BackendActor {
    pub fn with_components(
        resolver: Arc<MetadataResolver>,
        engine: Arc<DownloadEngine>,
        analysis: Arc<AnalysisClient>,
        receiver: mpsc::Receiver<BackendCommand>,
        sender: mpsc::Sender<BackendEvent>,
    ) -> Self {
        Self {
            receiver,
            sender,
            resolver,
            engine,
            analysis,
            session: ResolveSession::new(),
        }
    }

    pub async fn run(mut self) {
        info!("BackendActor started");
        let (resolved_tx, mut resolved_rx) = mpsc::channel::<Resolved>(8);

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(BackendCommand::Resolve { url }) => {
                        self.handle_resolve(url, resolved_tx.clone()).await;
                    }
                    Some(BackendCommand::Download {
                        metadata,
                        format,
                        out_dir,
                    }) => {
                        self.handle_download(metadata, format, out_dir);
                    }
                    Some(BackendCommand::Analyze { metadata, kind }) => {
                        self.handle_analyze(metadata, kind);
                    }
                    Some(BackendCommand::Shutdown) | None => {
                        info!("BackendActor shutting down");
                        self.session.cancel();
                        break;
                    }
                },
                Some((request, result)) = resolved_rx.recv() => {
                    self.handle_resolved(request, result).await;
                }
            }
        }
    }

    async fn handle_resolve(&mut self, url: String, done: mpsc::Sender<Resolved>) {
        let (request, token) = self.session.begin();
        let _ = self
            .sender
            .send(BackendEvent::ResolutionStarted { request })
            .await;

        let resolver = self.resolver.clone();
        tokio::spawn(async move {
            let result = resolver.resolve_with_cancel(&url, &token).await;
            let _ = done.send((request, result)).await;
        });
    }

    async fn handle_resolved(&mut self, request: u64, result: Result<Resolution, NebulaError>) {
        if matches!(result, Err(NebulaError::Cancelled)) || !self.session.finish(request) {
            debug!("Discarding result of superseded request {}", request);
            return;
        }

        let result = result.map_err(|e| e.user_message());
        let _ = self
            .sender
            .send(BackendEvent::ResolutionCompleted { request, result })
            .await;
    }

    fn handle_download(&self, metadata: VideoMetadata, format: Format, out_dir: PathBuf) {
        let engine = self.engine.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let (progress_tx, mut progress_rx) = mpsc::channel::<TransferEvent>(100);

            // Fold raw transfer events into tracker states for the front end
            let forward_sender = sender.clone();
            let forwarder = tokio::spawn(async move {
                let mut tracker = TransferTracker::new();
                while let Some(event) = progress_rx.recv().await {
                    if tracker.apply(event) {
                        let _ = forward_sender
                            .send(BackendEvent::Transfer {
                                state: tracker.state().clone(),
                                status: tracker.status_label(),
                            })
                            .await;
                    }
                }
            });

            let outcome = engine
                .download(&metadata, &format, &out_dir, progress_tx)
                .await;
            let _ = forwarder.await;

            let event = match outcome {
                Ok(path) => BackendEvent::DownloadSaved(path),
                Err(e) => BackendEvent::Error(e.to_string()),
            };
            let _ = sender.send(event).await;
        });
    }

    fn handle_analyze(&self, metadata: VideoMetadata, kind: AnalysisKind) {
        let analysis = self.analysis.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = analysis
                .analyze(&metadata, kind)
                .await
                .map_err(|e| e.user_message());
            let _ = sender
                .send(BackendEvent::AnalysisCompleted { kind, result })
                .await;
        });
    }
}
