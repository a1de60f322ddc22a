//! pdfdesk server
//!
//! Browser forms for everyday PDF chores. Each form uploads files and gets a
//! transformed PDF back as a download:
//!
//! - Merge several PDFs
//! - Split out selected pages
//! - Convert images to a PDF
//! - Delete, reorder and rotate pages
//! - Edit extracted text and rebuild a PDF from it
//!
//! ## Architecture
//!
//! Handlers buffer the upload into a per-request scratch directory, run the
//! transformation from `pdfdesk-core` on the blocking pool under a timeout,
//! and either stream the result back or flash an error and redirect to the
//! form. A janitor task started here sweeps stale files from the storage
//! folders.

use std::net::SocketAddr;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod flash;
mod handlers;
mod janitor;
mod routes;
mod scratch;
mod state;
mod upload;
mod views;

use config::Args;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pdfdesk server on {}:{}", args.host, args.port);

    for folder in [&args.upload_dir, &args.download_dir] {
        tokio::fs::create_dir_all(folder).await?;
    }

    let janitor = if args.no_janitor {
        info!("Janitor disabled");
        None
    } else {
        Some(janitor::spawn(args.janitor()))
    };

    // Create shared state
    let state = AppState::new(args.upload_dir.clone(), args.timeout_ms, args.page_policy());
    let app = routes::router(state, args.max_upload_bytes());

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Processing timeout: {}ms", args.timeout_ms);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(janitor) = janitor {
        info!(state = ?janitor.state(), "Stopping janitor");
        janitor.stop().await;
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
