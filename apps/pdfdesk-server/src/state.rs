//! Shared application state and the blocking-work bridge

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pdfdesk_core::{OutOfRangePolicy, PdfCommand, PdfDeskError, ProcessResult};

use crate::error::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Root for request scratch directories and extracted-text artifacts
    pub upload_dir: Arc<PathBuf>,
    /// PDF processing timeout in milliseconds
    pub timeout_ms: u64,
    /// How page numbers past the end of a document are treated
    pub page_policy: OutOfRangePolicy,
}

impl AppState {
    pub fn new(upload_dir: PathBuf, timeout_ms: u64, page_policy: OutOfRangePolicy) -> Self {
        Self {
            upload_dir: Arc::new(upload_dir),
            timeout_ms,
            page_policy,
        }
    }

    /// Run CPU-bound PDF work on the blocking pool, bounded by the
    /// configured timeout.
    pub async fn run_blocking<T, F>(&self, context: &'static str, work: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Result<T, PdfDeskError> + Send + 'static,
        T: Send + 'static,
    {
        let result = tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            tokio::task::spawn_blocking(work),
        )
        .await;

        match result {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => Err(AppError::from_core(context, err)),
            Ok(Err(join_err)) => Err(AppError::backend(
                context,
                format!("worker failed: {}", join_err),
            )),
            Err(_timeout) => Err(AppError::backend(
                context,
                format!("timed out after {}ms", self.timeout_ms),
            )),
        }
    }

    /// Execute a transformer command and log its metrics.
    pub async fn execute(
        &self,
        context: &'static str,
        command: PdfCommand,
    ) -> Result<ProcessResult, AppError> {
        let name = command.name();
        let result = self.run_blocking(context, move || command.execute()).await?;

        let metrics = &result.metrics;
        tracing::info!(
            operation = name,
            input_bytes = metrics.input_size_bytes,
            output_bytes = metrics.output_size_bytes,
            pages = metrics.page_count,
            elapsed_ms = metrics.processing_time_ms,
            "Processed document"
        );

        Ok(result)
    }
}
