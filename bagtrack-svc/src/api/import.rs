//! Import API handler
//!
//! POST /import-data: multipart upload (field `file`) or, for a request
//! without a multipart content type, the configured default source file.

use std::time::Duration;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::import::{import_orders, source};
use crate::models::ImportSummary;
use crate::AppState;

/// Multipart field carrying the spreadsheet
pub const UPLOAD_FIELD: &str = "file";

/// POST /import-data response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// POST /import-data
///
/// Replaces the whole orders table. On failure the previous table stays.
/// A request declaring a multipart body must carry a readable `file` field;
/// it never falls back to the default source.
pub async fn import_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let (bytes, origin) = if is_multipart(&headers) {
        let multipart = multipart.map_err(|rejection| {
            ApiError::SourceUnavailable(format!("Invalid multipart upload: {}", rejection.body_text()))
        })?;
        (read_upload(multipart).await?, "upload".to_string())
    } else {
        let path = &state.import.source_path;
        let timeout = Duration::from_secs(state.import.read_timeout_secs);
        let bytes = source::read_source_file(path, timeout).await?;
        (bytes, path.display().to_string())
    };

    tracing::info!(origin = %origin, bytes = bytes.len(), "Import requested");

    let summary = import_orders(&state, &bytes).await?;

    Ok(Json(ImportResponse {
        message: format!("Imported {} bags from {}", summary.total, origin),
        summary,
    }))
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::SourceUnavailable(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::SourceUnavailable(format!("Failed to read upload: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::SourceUnavailable(format!(
        "No file uploaded (expected multipart field '{}')",
        UPLOAD_FIELD
    )))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/"))
        .unwrap_or(false)
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import-data", post(import_data))
}
