//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pdfdesk_core::OutOfRangePolicy;

use crate::janitor::JanitorConfig;

/// Command-line arguments for the pdfdesk server
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfdesk-server")]
#[command(about = "Browser forms for merging, splitting and editing PDFs")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PDFDESK_PORT", default_value = "3000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "PDFDESK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Folder for uploads, request scratch directories and extracted text
    #[arg(long, env = "PDFDESK_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Folder for generated files, swept by the janitor
    #[arg(long, env = "PDFDESK_DOWNLOAD_DIR", default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Files older than this many seconds are deleted by the janitor
    #[arg(long, env = "PDFDESK_RETENTION_SECS", default_value = "600")]
    pub retention_secs: u64,

    /// Seconds between janitor sweeps
    #[arg(long, env = "PDFDESK_SWEEP_INTERVAL_SECS", default_value = "600")]
    pub sweep_interval_secs: u64,

    /// PDF processing timeout in milliseconds
    #[arg(long, env = "PDFDESK_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,

    /// Maximum request body size in megabytes
    #[arg(long, env = "PDFDESK_MAX_UPLOAD_MB", default_value = "64")]
    pub max_upload_mb: usize,

    /// Fail requests that name pages the document does not have
    #[arg(long)]
    pub strict_pages: bool,

    /// Do not start the background janitor
    #[arg(long)]
    pub no_janitor: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn page_policy(&self) -> OutOfRangePolicy {
        if self.strict_pages {
            OutOfRangePolicy::Reject
        } else {
            OutOfRangePolicy::Ignore
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn janitor(&self) -> JanitorConfig {
        JanitorConfig {
            folders: vec![self.upload_dir.clone(), self.download_dir.clone()],
            max_age: Duration::from_secs(self.retention_secs),
            interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
        }
    }
}
