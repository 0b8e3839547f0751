//! Error types for the bag tracking service
//!
//! Every failure reaches the client as `{"error", "kind", "details"?}` with a
//! machine-checkable `kind`. Nothing is retried automatically.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::import::ImportError;
use crate::ocr::RecognitionError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Expected column not found, or batch violates a table invariant (500)
    #[error("Import failed: {0}")]
    Schema(String),

    /// Import source unreadable (500)
    #[error("Import failed: {0}")]
    SourceUnavailable(String),

    /// Store read/write failure (500)
    #[error("Database error: {0}")]
    Persistence(String),

    /// Scan key matches no row (400)
    #[error("{0} is not in the bag list.")]
    NotFound(String),

    /// Matched row was scanned before (400)
    #[error("{0} has already been scanned.")]
    AlreadyScanned(String),

    /// Missing or empty request input (400)
    #[error("{0}")]
    InvalidInput(String),

    /// OCR service rejected the request or the job failed (500)
    #[error("Read API failed")]
    RecognitionUpstream(String),

    /// OCR job did not finish within the polling budget (500)
    #[error("Read API timed out")]
    RecognitionTimeout(String),
}

impl ApiError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Schema(_) => "SCHEMA_ERROR",
            ApiError::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            ApiError::Persistence(_) => "PERSISTENCE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyScanned(_) => "ALREADY_SCANNED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::RecognitionUpstream(_) => "RECOGNITION_UPSTREAM_ERROR",
            ApiError::RecognitionTimeout(_) => "RECOGNITION_TIMEOUT",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::AlreadyScanned(_) | ApiError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detail string reported next to the message
    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::Schema(detail)
            | ApiError::SourceUnavailable(detail)
            | ApiError::Persistence(detail)
            | ApiError::RecognitionUpstream(detail)
            | ApiError::RecognitionTimeout(detail) => Some(detail),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, details = ?self.details(), "Request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Schema(msg) => ApiError::Schema(msg),
            ImportError::SourceUnavailable(msg) => ApiError::SourceUnavailable(msg),
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::Timeout { .. } => ApiError::RecognitionTimeout(err.to_string()),
            other => ApiError::RecognitionUpstream(other.to_string()),
        }
    }
}

impl From<bagtrack_common::Error> for ApiError {
    fn from(err: bagtrack_common::Error) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
