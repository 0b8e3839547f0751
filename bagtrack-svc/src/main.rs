//! bagtrack - laundry bag tracking service
//!
//! Imports the order spreadsheet, classifies orders (rush, hang dry / wash &
//! fold) and records bag scans by name, QR code or tag photo.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bagtrack_common::config::{
    load_toml_config_or_default, prepare_root_folder, resolve_ocr_api_key, resolve_root_folder,
    ConfigOrigin, DEFAULT_PORT,
};
use bagtrack_svc::ocr::{RecognitionClient, RecognitionError};
use bagtrack_svc::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for bagtrack
#[derive(Parser, Debug)]
#[command(name = "bagtrack")]
#[command(about = "Laundry bag import and scan tracking service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "BAGTRACK_PORT")]
    port: Option<u16>,

    /// Folder holding bagtrack.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: ~/.config/bagtrack/bagtrack.toml)
    #[arg(short, long, env = "BAGTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// CSV read by POST /import-data when no file is uploaded
    #[arg(short, long, env = "BAGTRACK_SOURCE")]
    source: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, origin) = load_toml_config_or_default(args.config.as_deref());

    // RUST_LOG wins over the TOML level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bagtrack v{}", env!("CARGO_PKG_VERSION"));

    match &origin {
        ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
        ConfigOrigin::Defaults => info!("No config file found, using defaults"),
        ConfigOrigin::Fallback { path, reason } => {
            warn!("Ignoring config {} ({}), using defaults", path.display(), reason)
        }
    }

    if let Some(source) = args.source {
        config.import.source_path = source;
    }
    info!("Default import source: {}", config.import.source_path.display());

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = prepare_root_folder(&root_folder)
        .with_context(|| format!("Failed to initialize root folder {}", root_folder.display()))?;
    info!("Database: {}", db_path.display());

    let pool = bagtrack_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;
    info!("✓ Connected to database");

    let mut state = AppState::new(pool, config.import.clone());

    let api_key = resolve_ocr_api_key(&config.recognition);
    match RecognitionClient::from_config(&config.recognition, api_key) {
        Ok(client) => {
            info!("✓ OCR enabled");
            state = state.with_recognition(client);
        }
        Err(RecognitionError::NotConfigured) => {
            warn!("OCR endpoint or key not configured; POST /api/ocr will report an error")
        }
        Err(e) => return Err(e).context("Failed to create OCR client"),
    }

    let app = build_router(state);

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("bagtrack listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
