//! Manual / QR scan handler
//!
//! POST /scan with `{"name": ...}` or `{"qr": ...}`

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::orders::ScanOutcome;
use crate::error::{ApiError, ApiResult};
use crate::models::ScanKey;
use crate::AppState;

/// POST /scan request; `qr` wins when both are given
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qr: Option<String>,
}

impl ScanRequest {
    /// Trimmed, non-empty lookup key
    pub fn key(&self) -> Option<ScanKey> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        non_empty(&self.qr)
            .map(ScanKey::Identifier)
            .or_else(|| non_empty(&self.name).map(ScanKey::Name))
    }
}

/// POST /scan response
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub customer: String,
}

/// POST /scan
pub async fn scan_bag(
    State(state): State<AppState>,
    body: Option<Json<ScanRequest>>,
) -> ApiResult<Json<ScanResponse>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let key = request
        .key()
        .ok_or_else(|| ApiError::InvalidInput("No name provided.".to_string()))?;

    let outcome = {
        let _guard = state.table_guard.read().await;
        crate::db::orders::scan(&state.db, &key, Utc::now()).await?
    };

    match outcome {
        ScanOutcome::Scanned { customer } => {
            tracing::info!(customer = %customer, key = ?key, "Bag scanned");
            Ok(Json(ScanResponse {
                message: format!("{} scanned successfully!", customer),
                customer,
            }))
        }
        ScanOutcome::NotFound => Err(ApiError::NotFound(key.value().to_string())),
        ScanOutcome::AlreadyScanned { customer } => Err(ApiError::AlreadyScanned(customer)),
    }
}

/// Build scan routes
pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/scan", post(scan_bag))
}
