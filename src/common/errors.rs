//! Error taxonomy for intake, validation, transport, and the local HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;

/// Batch rejected by the validator. The accepted set is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Max {limit} images allowed.")]
    TooManyFiles { limit: usize },
    #[error("Max total size is {limit_mb} MB.")]
    TooLarge { limit_mb: u64 },
}

/// Non-fatal outcome of validation. Part of the batch was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("Some duplicate images were skipped.")]
    DuplicatesSkipped,
}

/// Failure of the single stitch request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status. The body is not inspected.
    #[error("Failed to stitch image")]
    Rejected { status: u16 },
    /// Connection, timeout, or body read failure.
    #[error("{0}")]
    Request(String),
}

/// A picker or drop entry could not be turned into a candidate file.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by the local HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
