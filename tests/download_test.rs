//! Streaming downloads against a mock file server.

use nebulastream::downloader::progress::SIMULATED_CEILING;
use nebulastream::downloader::{
    DownloadConfig, DownloadEngine, TransferEvent, TransferState, TransferTracker,
};
use nebulastream::extractor::resolver::synthetic_metadata;
use nebulastream::extractor::{Format, VideoId, VideoMetadata};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn video() -> VideoMetadata {
    let mut metadata = synthetic_metadata(&VideoId::new("dQw4w9WgXcQ").unwrap());
    metadata.title = "Never Gonna Give You Up".to_string();
    metadata
}

fn format_at(url: String) -> Format {
    Format {
        quality: "720p".to_string(),
        format: "mp4".to_string(),
        size: "1 MB".to_string(),
        fps: 30,
        url,
        has_audio: true,
        has_video: true,
        bitrate: None,
        real_size: None,
    }
}

fn engine() -> DownloadEngine {
    DownloadEngine::new(DownloadConfig {
        progress_interval: Duration::ZERO,
        simulate_unknown_length: true,
    })
}

/// Run a download and fold every emitted event into a tracker
async fn run(
    engine: &DownloadEngine,
    format: &Format,
    out_dir: &std::path::Path,
) -> (
    Result<std::path::PathBuf, nebulastream::NebulaError>,
    Vec<TransferEvent>,
    TransferTracker,
) {
    let (tx, mut rx) = mpsc::channel(1024);
    let result = engine.download(&video(), format, out_dir, tx).await;

    let mut events = Vec::new();
    let mut tracker = TransferTracker::new();
    while let Some(event) = rx.recv().await {
        tracker.apply(event.clone());
        events.push(event);
    }
    (result, events, tracker)
}

#[tokio::test]
async fn download_writes_file_and_finishes() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/media/720.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("temp dir");
    let format = format_at(format!("{}/media/720.mp4", server.uri()));
    let (result, events, tracker) = run(&engine(), &format, temp.path()).await;

    let saved = result.expect("download succeeds");
    assert_eq!(
        saved.file_name().unwrap().to_string_lossy(),
        "Never_Gonna_Give_You_Up_720p.mp4"
    );
    assert_eq!(tokio::fs::read(&saved).await.unwrap(), body);

    assert_eq!(events.first(), Some(&TransferEvent::Started));
    assert_eq!(events.last(), Some(&TransferEvent::Finished));
    assert!(events.iter().any(|e| matches!(
        e,
        TransferEvent::Progress { downloaded, total: Some(total), .. }
            if *downloaded == body.len() as u64 && *total == body.len() as u64
    )));

    assert_eq!(tracker.state(), &TransferState::Succeeded);
    assert_eq!(tracker.percent(), 100.0);
    assert_eq!(tracker.downloaded_bytes(), body.len() as u64);
}

#[tokio::test]
async fn download_creates_missing_directories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("temp dir");
    let nested = temp.path().join("a").join("b");
    let format = format_at(format!("{}/clip", server.uri()));
    let (result, _, _) = run(&engine(), &format, &nested).await;

    assert!(result.expect("download succeeds").starts_with(&nested));
}

#[tokio::test]
async fn http_error_fails_and_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("temp dir");
    let format = format_at(format!("{}/missing.mp4", server.uri()));
    let (result, events, tracker) = run(&engine(), &format, temp.path()).await;

    assert!(result.is_err());
    assert!(matches!(events.last(), Some(TransferEvent::Errored(_))));
    assert!(matches!(tracker.state(), TransferState::Failed(_)));
    assert_eq!(tracker.status_label(), "Error");
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn empty_link_is_refused_before_starting() {
    let temp = TempDir::new().expect("temp dir");
    let (result, events, tracker) = run(&engine(), &format_at(String::new()), temp.path()).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("valid download link"));
    assert!(events.is_empty());
    assert_eq!(tracker.state(), &TransferState::Idle);
}

/// Serve one chunked response with no Content-Length, pausing between chunks
async fn serve_chunked(pause: Duration) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head: &[u8] = b"HTTP/1.1 200 OK\r\n\
            Content-Type: video/mp4\r\n\
            Transfer-Encoding: chunked\r\n\r\n\
            5\r\nhello\r\n";
        socket.write_all(head).await.expect("write head");
        socket.flush().await.expect("flush");
        tokio::time::sleep(pause).await;
        socket
            .write_all(b"5\r\nworld\r\n0\r\n\r\n")
            .await
            .expect("write tail");
        socket.flush().await.expect("flush");
    });

    format!("http://{}/stream.mp4", addr)
}

#[tokio::test]
async fn unknown_length_simulates_progress_until_finished() {
    let url = serve_chunked(Duration::from_millis(1_300)).await;
    let temp = TempDir::new().expect("temp dir");
    let (result, events, tracker) = run(&engine(), &format_at(url), temp.path()).await;

    let saved = result.expect("download succeeds");
    assert_eq!(tokio::fs::read(&saved).await.unwrap(), b"helloworld");

    assert!(
        events.iter().any(|e| matches!(e, TransferEvent::Tick { .. })),
        "simulator ticks while the length is unknown"
    );
    assert!(events
        .iter()
        .all(|e| !matches!(e, TransferEvent::Progress { total: Some(_), .. })));

    // Replay: nothing before the finish may pass the simulated ceiling
    let mut replay = TransferTracker::new();
    for event in &events {
        if *event == TransferEvent::Finished {
            break;
        }
        replay.apply(event.clone());
        assert!(replay.percent() <= SIMULATED_CEILING);
    }
    assert!(replay.is_active());

    assert_eq!(events.last(), Some(&TransferEvent::Finished));
    assert_eq!(tracker.state(), &TransferState::Succeeded);
    assert_eq!(tracker.percent(), 100.0);
    assert_eq!(tracker.downloaded_bytes(), 10);
}

#[tokio::test]
async fn unknown_length_without_simulation_emits_no_ticks() {
    let url = serve_chunked(Duration::from_millis(700)).await;
    let temp = TempDir::new().expect("temp dir");
    let engine = DownloadEngine::new(DownloadConfig {
        progress_interval: Duration::ZERO,
        simulate_unknown_length: false,
    });
    let (result, events, tracker) = run(&engine, &format_at(url), temp.path()).await;

    assert!(result.is_ok());
    assert!(events.iter().all(|e| !matches!(e, TransferEvent::Tick { .. })));
    assert_eq!(tracker.state(), &TransferState::Succeeded);
}
