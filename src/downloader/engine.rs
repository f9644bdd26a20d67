//! Streaming download engine

use crate::downloader::progress::TransferEvent;
use crate::downloader::simulator::ProgressSimulator;
use crate::extractor::models::{Format, VideoMetadata};
use crate::utils::error::NebulaError;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Longest title prefix kept in a filename
pub const MAX_TITLE_CHARS: usize = 50;

/// Download configuration
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Minimum spacing between progress events
    pub progress_interval: Duration,
    /// Run the progress simulator when the server sends no length
    pub simulate_unknown_length: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(250),
            simulate_unknown_length: true,
        }
    }
}

/// Streams one format to disk and reports through [`TransferEvent`]s
pub struct DownloadEngine {
    client: Client,
    config: DownloadConfig,
}

impl DownloadEngine {
    pub fn new(config: DownloadConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: DownloadConfig) -> Self {
        Self { client, config }
    }

    /// Download `format` of `video` into `out_dir`.
    ///
    /// Emits `Started`, then progress, then exactly one of `Finished` or
    /// `Errored`. A format without a URL is refused before anything starts.
    pub async fn download(
        &self,
        video: &VideoMetadata,
        format: &Format,
        out_dir: &Path,
        events: mpsc::Sender<TransferEvent>,
    ) -> Result<PathBuf, NebulaError> {
        if format.url.is_empty() {
            return Err(NebulaError::DownloadError(
                "This format does not have a valid download link.".to_string(),
            ));
        }

        let filename = download_filename(&video.title, &format.quality, &format.format);
        let output_path = out_dir.join(filename);
        let _ = events.send(TransferEvent::Started).await;

        match self.transfer(&format.url, &output_path, &events).await {
            Ok(bytes) => {
                info!("Saved {} bytes to {}", bytes, output_path.display());
                let _ = events.send(TransferEvent::Finished).await;
                Ok(output_path)
            }
            Err(e) => {
                error!("Download of {} failed: {}", format.url, e);
                if let Err(rm) = tokio::fs::remove_file(&output_path).await {
                    debug!("No partial file to remove at {}: {}", output_path.display(), rm);
                }
                let _ = events.send(TransferEvent::Errored(e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn transfer(
        &self,
        url: &str,
        output_path: &Path,
        events: &mpsc::Sender<TransferEvent>,
    ) -> Result<u64, NebulaError> {
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(NebulaError::DownloadError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let total = response.content_length().filter(|len| *len > 0);
        let simulator = match total {
            None if self.config.simulate_unknown_length => {
                debug!("No content length for {}, simulating progress", url);
                Some(ProgressSimulator::spawn(events.clone()))
            }
            _ => None,
        };

        let mut file = BufWriter::new(File::create(output_path).await?);
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        let start_time = Instant::now();
        let mut last_update = start_time;

        let result: Result<(), NebulaError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                downloaded += chunk.len() as u64;

                let now = Instant::now();
                if now.duration_since(last_update) >= self.config.progress_interval {
                    send_progress(events, downloaded, total, start_time).await;
                    last_update = now;
                }
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Some(simulator) = simulator {
            simulator.stop().await;
        }
        result?;

        send_progress(events, downloaded, total, start_time).await;
        Ok(downloaded)
    }
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self::new(DownloadConfig::default())
    }
}

async fn send_progress(
    events: &mpsc::Sender<TransferEvent>,
    downloaded: u64,
    total: Option<u64>,
    start_time: Instant,
) {
    let elapsed = start_time.elapsed().as_secs_f64();
    let bytes_per_sec = if elapsed > 0.0 {
        downloaded as f64 / elapsed
    } else {
        0.0
    };

    if let Err(e) = events
        .send(TransferEvent::Progress {
            downloaded,
            total,
            bytes_per_sec,
        })
        .await
    {
        warn!("Failed to send progress update: {}", e);
    }
}

/// Filename for a saved format: the title with every character outside
/// `[A-Za-z0-9]` replaced by `_`, cut to 50 characters, then quality and
/// container.
pub fn download_filename(title: &str, quality: &str, container: &str) -> String {
    let clean_title: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_TITLE_CHARS)
        .collect();
    format!("{}_{}.{}", clean_title, quality, container)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_sanitizes() {
        assert_eq!(
            download_filename("Never Gonna Give You Up!", "1080p", "mp4"),
            "Never_Gonna_Give_You_Up__1080p.mp4"
        );
    }

    #[test]
    fn test_download_filename_truncates_title() {
        let title = "a".repeat(80);
        let name = download_filename(&title, "128kbps", "mp3");
        assert_eq!(name, format!("{}_128kbps.mp3", "a".repeat(50)));
    }

    #[test]
    fn test_download_filename_non_ascii() {
        assert_eq!(download_filename("Café/ñ", "720p", "webm"), "Caf____720p.webm");
    }

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert!(config.simulate_unknown_length);
        assert!(config.progress_interval > Duration::ZERO);
    }
}
