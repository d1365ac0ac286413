mod config;
mod status;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use media::OcrBridge;
use ocrlabel_core::{ImageCatalog, LabelLedger, LabelingService, NextImage, ProgressTracker};
use ocrlabel_gateway::AppState;

use config::Config;

#[derive(Parser)]
#[command(name = "ocrlabel")]
#[command(about = "OCR labeling service: review machine transcriptions and log corrected labels")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the labeling HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding the images to label
        #[arg(long)]
        images_dir: Option<PathBuf>,
        /// Label log to append to
        #[arg(long)]
        labels_file: Option<PathBuf>,
    },
    /// Probe a running server
    Status {
        /// Base URL of the server (defaults to the configured local port)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show labeling progress straight from disk, without a server
    Progress,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(config.log_dir.as_deref(), &config.log_level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            images_dir,
            labels_file,
        } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                images_dir: images_dir.unwrap_or(config.images_dir),
                labels_file: labels_file.unwrap_or(config.labels_file),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status { url } => {
            let base = url.unwrap_or_else(|| format!("http://localhost:{}", config.port));
            status::print_status(base.trim_end_matches('/')).await?;
        }
        Commands::Progress => print_progress(&config).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        images_dir = %config.images_dir.display(),
        labels_file = %config.labels_file.display(),
        ocr_command = %config.ocr_command,
        "Starting OCR labeling service"
    );

    let recognizer = OcrBridge::from_command_line(&config.ocr_command)
        .context("invalid OCRLABEL_OCR_COMMAND")?;
    let service = LabelingService::new(
        ImageCatalog::new(&config.images_dir),
        LabelLedger::new(&config.labels_file),
        Arc::new(recognizer),
    );

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind_address, config.port))?;

    let state = Arc::new(AppState { service });
    ocrlabel_gateway::start_server(addr, state, &config.cors_origins).await
}

async fn print_progress(config: &Config) -> Result<()> {
    let catalog = ImageCatalog::new(&config.images_dir);
    let ledger = LabelLedger::new(&config.labels_file);
    let tracker = ProgressTracker::new(&catalog, &ledger);

    let progress = tracker.progress().await?;
    println!("Images dir:   {}", config.images_dir.display());
    println!("Labels file:  {}", config.labels_file.display());
    println!("Total images: {}", progress.total());
    println!("Processed:    {}", progress.processed_count);
    println!("Remaining:    {}", progress.remaining());

    match tracker.next_unprocessed().await? {
        Some(NextImage::Pending { image_name, .. }) => println!("Next image:   {image_name}"),
        Some(NextImage::Exhausted { .. }) => println!("All images have been processed"),
        None => println!("No images found"),
    }
    Ok(())
}
