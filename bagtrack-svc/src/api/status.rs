//! Status and listing handlers
//!
//! GET /status, GET /bags. Both read under the shared table guard so they
//! never observe an import half-applied.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{Category, OrderRow, StatusReport};
use crate::AppState;

/// One bag in GET /bags
#[derive(Debug, Serialize)]
pub struct BagView {
    pub identifier: String,
    pub customer: String,
    pub category: Category,
    pub rush: bool,
    pub scanned: bool,
    pub scan_date: Option<DateTime<Utc>>,
    /// Weight cell as imported
    pub lbs: Option<String>,
}

impl From<OrderRow> for BagView {
    fn from(row: OrderRow) -> Self {
        Self {
            identifier: row.identifier,
            customer: row.customer,
            category: row.category,
            rush: row.rush,
            scanned: row.scanned,
            scan_date: row.scan_date,
            lbs: row.weight,
        }
    }
}

/// GET /bags response
#[derive(Debug, Serialize)]
pub struct BagsResponse {
    pub bags: Vec<BagView>,
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusReport>> {
    let _guard = state.table_guard.read().await;
    let report = crate::db::orders::status(&state.db).await?;
    Ok(Json(report))
}

/// GET /bags
pub async fn list_bags(State(state): State<AppState>) -> ApiResult<Json<BagsResponse>> {
    let _guard = state.table_guard.read().await;
    let rows = crate::db::orders::list(&state.db).await?;
    Ok(Json(BagsResponse {
        bags: rows.into_iter().map(BagView::from).collect(),
    }))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/bags", get(list_bags))
}
