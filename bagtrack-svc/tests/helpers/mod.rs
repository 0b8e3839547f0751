//! Test Helper Utilities
//!
//! Shared utilities for testing bagtrack-svc

#![allow(dead_code)]

pub mod mock_read_api;

use axum::body::Body;
use axum::http::Request;
use bagtrack_common::config::ImportConfig;
use bagtrack_svc::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

const BOUNDARY: &str = "bagtrack-test-boundary";

/// Three-row sheet: rows 1 and 2 share 7/1 (row 1 marked TODAY), row 3 is 7/2
pub const SAMPLE_CSV: &str = "\
Date,Customer Name,WF lbs,QR Code
7/1 TODAY,Jane Doe,12,QR-1
7/1,John Smith,hang dry,QR-2
7/2,Ann Poe,0,
";

/// App state over an in-memory database
pub async fn memory_state() -> AppState {
    let pool = bagtrack_common::db::init_memory_database()
        .await
        .expect("Should create in-memory database");
    AppState::new(pool, ImportConfig::default())
}

/// App state over an on-disk database (real connection pool)
///
/// Returns (TempDir, AppState) - TempDir must be kept alive for duration of test
pub async fn file_state() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().expect("Should create temp dir");
    let pool: SqlitePool = bagtrack_common::db::init_database(&temp_dir.path().join("bagtrack.db"))
        .await
        .expect("Should create database");
    (temp_dir, AppState::new(pool, ImportConfig::default()))
}

/// Request with an empty body
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// JSON POST request
pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// multipart/form-data POST with a single file field
pub fn multipart_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
