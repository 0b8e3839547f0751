//! Tag photo handler
//!
//! POST /api/ocr with a multipart `image` field. Read-only: resolving a
//! name never marks a bag scanned.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::ocr::{RecognitionError, TagReading};
use crate::AppState;

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// POST /api/ocr
pub async fn recognize_tag(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> ApiResult<Json<TagReading>> {
    let image = match multipart {
        Some(multipart) => read_image(multipart).await?,
        None => None,
    }
    .ok_or_else(|| ApiError::InvalidInput("No image uploaded".to_string()))?;

    let client = state
        .recognition
        .as_ref()
        .ok_or(RecognitionError::NotConfigured)?;

    let lines = client.read_lines(image).await?;

    let known_names = {
        let _guard = state.table_guard.read().await;
        crate::db::orders::known_names(&state.db).await?
    };

    let reading = TagReading::from_lines(&lines, &known_names);
    tracing::info!(
        name = %reading.name,
        order_type = %reading.order_type,
        lines = lines.len(),
        "Tag resolved"
    );

    Ok(Json(reading))
}

async fn read_image(mut multipart: Multipart) -> ApiResult<Option<Vec<u8>>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidInput(format!("Failed to read image: {}", e)))?;
            return Ok(Some(bytes.to_vec()).filter(|b| !b.is_empty()));
        }
    }

    Ok(None)
}

/// Build OCR routes
pub fn ocr_routes() -> Router<AppState> {
    Router::new().route("/api/ocr", post(recognize_tag))
}
