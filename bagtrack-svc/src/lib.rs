//! bagtrack-svc library - bag tracking microservice
//!
//! Imports the day's order spreadsheet, classifies each order and tracks
//! which bags have been scanned (by name, QR identifier or tag photo).

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use bagtrack_common::config::ImportConfig;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod ocr;

pub use crate::error::{ApiError, ApiResult};

use crate::ocr::RecognitionClient;

/// Largest accepted request body (tag photos, spreadsheets)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across HTTP handlers
///
/// Created once in `main` and handed to every handler; there is no
/// process-global order list.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool holding the `orders` table
    pub db: SqlitePool,
    /// Import takes the write side for its replace step; reads and scans
    /// take the read side
    pub table_guard: Arc<RwLock<()>>,
    /// Import source settings
    pub import: ImportConfig,
    /// OCR client, absent when no endpoint/key is configured
    pub recognition: Option<Arc<RecognitionClient>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, import: ImportConfig) -> Self {
        Self {
            db,
            table_guard: Arc::new(RwLock::new(())),
            import,
            recognition: None,
        }
    }

    /// Attach an OCR client
    pub fn with_recognition(mut self, client: RecognitionClient) -> Self {
        self.recognition = Some(Arc::new(client));
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::status_routes())
        .merge(api::scan_routes())
        .merge(api::ocr_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
