//! NebulaStream - YouTube metadata lookup and download companion
//!
//! Resolves a pasted link through a chain of public metadata mirrors,
//! shows the available formats and can save one of them or ask a
//! generative model to write about the video.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nebulastream::analysis::AnalysisKind;
use nebulastream::backend::{BackendCommand, BackendEvent};
use nebulastream::display::{render_resolution, select_format, SYNTHETIC_WARNING};
use nebulastream::downloader::{TransferEvent, TransferState, TransferTracker};
use nebulastream::extractor::Resolution;
use nebulastream::{App, AppSettings};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nebulastream", version, about)]
struct Args {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a video and list its formats
    Resolve {
        url: String,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save one format of a video
    Download {
        url: String,
        /// Quality label or table number; defaults to the first format
        #[arg(short, long)]
        quality: Option<String>,
        /// Target directory; defaults to the configured download location
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Ask the model to write about a video
    Analyze {
        url: String,
        #[arg(short, long, value_enum, default_value_t = AnalysisKind::Summary)]
        kind: AnalysisKind,
    },
    /// Read links from stdin; a new link supersedes the previous lookup
    Interactive,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = AppSettings::load(args.config.as_deref()).context("Failed to load settings")?;
    let app = App::new(settings)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match args.command {
            Command::Resolve { url, json } => resolve_cli(&app, &url, json).await,
            Command::Download { url, quality, out } => {
                download_cli(&app, &url, quality.as_deref(), out).await
            }
            Command::Analyze { url, kind } => analyze_cli(&app, &url, kind).await,
            Command::Interactive => interactive_cli(&app).await,
        }
    })
}

async fn resolve(app: &App, url: &str) -> Result<Resolution> {
    match app.resolver.resolve(url).await {
        Ok(resolution) => {
            if resolution.origin.is_synthetic() {
                eprintln!("WARNING: {}", SYNTHETIC_WARNING);
            }
            Ok(resolution)
        }
        Err(e) => bail!(e.user_message()),
    }
}

async fn resolve_cli(app: &App, url: &str, json: bool) -> Result<()> {
    let resolution = resolve(app, url).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print!("{}", render_resolution(&resolution));
    }
    Ok(())
}

async fn download_cli(
    app: &App,
    url: &str,
    quality: Option<&str>,
    out: Option<PathBuf>,
) -> Result<()> {
    let resolution = resolve(app, url).await?;
    let formats = &resolution.metadata.formats;
    let format = match quality {
        Some(choice) => select_format(formats, choice)
            .with_context(|| format!("No format matches '{}'", choice))?,
        None => formats.first().context("No formats available")?,
    };
    let out_dir = out.unwrap_or_else(|| app.settings.download_location.clone());

    println!(
        "Downloading {} ({} {})",
        resolution.metadata.title, format.quality, format.format
    );

    // Create progress channel
    let (progress_tx, mut progress_rx) = mpsc::channel::<TransferEvent>(100);

    // Spawn progress reporter
    let reporter = tokio::spawn(async move {
        let mut tracker = TransferTracker::new();
        while let Some(event) = progress_rx.recv().await {
            if tracker.apply(event) {
                eprint!(
                    "\r{:>5.1}%  {:<12}",
                    tracker.percent(),
                    tracker.status_label()
                );
                let _ = std::io::stderr().flush();
            }
        }
        eprintln!();
    });

    let result = app
        .engine
        .download(&resolution.metadata, format, &out_dir, progress_tx)
        .await;
    let _ = reporter.await;

    let path = result.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    println!("Saved to {}", path.display());
    Ok(())
}

async fn analyze_cli(app: &App, url: &str, kind: AnalysisKind) -> Result<()> {
    let resolution = resolve(app, url).await?;
    match app.analysis.analyze(&resolution.metadata, kind).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => bail!(e.user_message()),
    }
}

/// Line-driven loop over the backend actor.
///
/// A line holding a link starts a lookup. `download <n|quality>` and
/// `analyze <kind>` act on the last shown video. `quit` exits.
async fn interactive_cli(app: &App) -> Result<()> {
    let (commands, mut events, handle) = app.spawn_backend();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<Resolution> = None;

    println!("Paste a YouTube link (or 'download <n>', 'analyze <kind>', 'quit').");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                match interactive_command(app, line, current.as_ref()) {
                    Ok(cmd) => commands.send(cmd).await?,
                    Err(message) => eprintln!("{}", message),
                }
            }
            Some(event) = events.recv() => {
                if let Some(resolution) = show_event(event) {
                    current = Some(resolution);
                }
            }
        }
    }

    commands.send(BackendCommand::Shutdown).await?;
    let _ = handle.await;
    Ok(())
}

fn interactive_command(
    app: &App,
    line: &str,
    current: Option<&Resolution>,
) -> std::result::Result<BackendCommand, String> {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    match verb {
        "download" | "analyze" => {
            let resolution = current.ok_or("Resolve a video first.")?;
            let metadata = resolution.metadata.clone();
            if verb == "download" {
                let format = select_format(&metadata.formats, rest)
                    .ok_or_else(|| format!("No format matches '{}'", rest.trim()))?
                    .clone();
                Ok(BackendCommand::Download {
                    metadata,
                    format,
                    out_dir: app.settings.download_location.clone(),
                })
            } else {
                let kind = <AnalysisKind as clap::ValueEnum>::from_str(rest.trim(), true)?;
                Ok(BackendCommand::Analyze { metadata, kind })
            }
        }
        _ => Ok(BackendCommand::Resolve {
            url: line.to_string(),
        }),
    }
}

fn show_event(event: BackendEvent) -> Option<Resolution> {
    match event {
        BackendEvent::ResolutionStarted { .. } => println!("Fetching video details..."),
        BackendEvent::ResolutionCompleted { result, .. } => match result {
            Ok(resolution) => {
                if resolution.origin.is_synthetic() {
                    eprintln!("WARNING: {}", SYNTHETIC_WARNING);
                }
                print!("{}", render_resolution(&resolution));
                return Some(resolution);
            }
            Err(message) => eprintln!("{}", message),
        },
        BackendEvent::Transfer { state, status } => match state {
            TransferState::InProgress { percent, .. } => {
                println!("{:>5.1}%  {}", percent, status)
            }
            TransferState::Failed(reason) => eprintln!("{}: {}", status, reason),
            _ => println!("{}", status),
        },
        BackendEvent::DownloadSaved(path) => println!("Saved to {}", path.display()),
        BackendEvent::AnalysisCompleted { kind, result } => match result {
            Ok(text) => println!("[{}]\n{}", kind, text),
            Err(message) => eprintln!("{}", message),
        },
        BackendEvent::Error(message) => eprintln!("{}", message),
    }
    None
}
