//! Error types for the pdfdesk server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pdfdesk_core::PdfDeskError;
use thiserror::Error;

/// Everything a request can fail with. Each variant ends up as a flash
/// message on the form the request came from.
#[derive(Error, Debug)]
pub enum AppError {
    /// The submission itself is unusable: missing input, bad page text,
    /// wrong file type.
    #[error("{0}")]
    Validation(String),

    /// A document id that has no artifact (never existed or already swept).
    #[error("{0}")]
    NotFound(String),

    /// The PDF backend, the filesystem or the worker pool failed.
    #[error("{context}: {message}")]
    Backend {
        context: &'static str,
        message: String,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn backend(context: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Backend {
            context,
            message: err.to_string(),
        }
    }

    /// Classify a core error: problems with what the user asked for are
    /// validation errors, everything else is a backend failure.
    pub fn from_core(context: &'static str, err: PdfDeskError) -> Self {
        if err.is_user_error() {
            AppError::Validation(err.to_string())
        } else {
            AppError::backend(context, err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log at a level matching who is at fault.
    pub fn log(&self) {
        match self {
            AppError::Backend { context, message } => {
                tracing::error!(context = %context, error = %message, "Request failed")
            }
            other => tracing::info!(error = %other, "Rejected submission"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), self.to_string()).into_response()
    }
}
