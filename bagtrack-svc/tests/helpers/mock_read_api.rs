//! Local stand-in for the cloud Read API
//!
//! Serves the submit endpoint and one operation URL. The job reports
//! `running` for `pending_polls` polls, then `final_status`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

pub const TEST_KEY: &str = "test-key";

pub struct MockReadApi {
    pub pending_polls: u32,
    pub final_status: &'static str,
    pub lines: Vec<&'static str>,
    pub polls: AtomicU32,
    pub submits: AtomicU32,
}

impl MockReadApi {
    pub fn new(pending_polls: u32, final_status: &'static str, lines: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            pending_polls,
            final_status,
            lines,
            polls: AtomicU32::new(0),
            submits: AtomicU32::new(0),
        })
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    api: Arc<MockReadApi>,
    base_url: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("Ocp-Apim-Subscription-Key")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_KEY)
}

async fn submit(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "Access denied due to invalid subscription key").into_response();
    }
    state.api.submits.fetch_add(1, Ordering::SeqCst);

    let operation_url = format!("{}/operations/1", state.base_url);
    (StatusCode::ACCEPTED, [("Operation-Location", operation_url)]).into_response()
}

async fn poll(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let count = state.api.polls.fetch_add(1, Ordering::SeqCst) + 1;

    if count <= state.api.pending_polls {
        return Json(json!({ "status": "running" })).into_response();
    }

    let lines: Vec<_> = state.api.lines.iter().map(|text| json!({ "text": text })).collect();
    Json(json!({
        "status": state.api.final_status,
        "analyzeResult": { "readResults": [ { "lines": lines } ] }
    }))
    .into_response()
}

/// Start the mock on an ephemeral port; returns its base URL
pub async fn spawn(api: Arc<MockReadApi>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/vision/v3.2/read/analyze", post(submit))
        .route("/operations/1", get(poll))
        .with_state(MockState {
            api,
            base_url: base_url.clone(),
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base_url
}
