// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Axum routes and handlers.
//
// Request bodies are unbounded: a base64-encoded braille book easily exceeds
// axum's default 2 MB body limit.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use graham_core::error::BridgeError;
use graham_core::types::{AttemptState, PrintBody, PrintJobRequest, TestPrintBody};
use graham_print::PrintService;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::watch;
use tracing::debug;

use crate::{console, cors, stream};

/// Shared state handed to every handler.
pub struct AppStateInner {
    pub service: PrintService,
    /// Flips to `true` when the server is shutting down; open log streams end.
    pub shutdown: watch::Receiver<bool>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(service: PrintService, shutdown: watch::Receiver<bool>) -> AppState {
        Arc::new(Self { service, shutdown })
    }
}

/// Creates the router with every endpoint and the CORS layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(console_page))
        .route("/status", get(status))
        .route("/print", post(print))
        .route("/printers", get(printers))
        .route("/testprint", post(test_print))
        .route("/log-stream", get(stream::log_stream))
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(cors::allow_any_origin))
        .with_state(state)
}

async fn console_page() -> Html<&'static str> {
    Html(console::CONSOLE_HTML)
}

/// Liveness probe. Never touches the journal.
async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /print {"printer": "...", "data": "<base64>"}`.
async fn print(State(state): State<AppState>, body: Bytes) -> Response {
    debug!(state = ?AttemptState::Received, body_bytes = body.len(), "print request");
    let request = match parse_body::<PrintBody>(&body).and_then(PrintJobRequest::try_from) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    let outcome = state.service.submit(request).await;
    match outcome.result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /testprint {"printer": "..."}`.
async fn test_print(State(state): State<AppState>, body: Bytes) -> Response {
    debug!(state = ?AttemptState::Received, "test print request");
    let printer = match parse_body::<TestPrintBody>(&body) {
        Ok(body) => body.printer,
        Err(e) => return error_response(&e),
    };

    match state.service.print_test_page(printer).await {
        Ok(outcome) => match outcome.result {
            Ok(()) => Json(json!({ "status": "queued" })).into_response(),
            Err(e) => error_response(&e),
        },
        Err(e) => error_response(&e),
    }
}

async fn printers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.printers().await)
}

/// JSON bodies are accepted whatever the Content-Type, so simple
/// cross-origin requests work without a preflight.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> graham_core::error::Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| BridgeError::InvalidRequest(format!("invalid JSON body: {e}")))
}

pub fn error_status(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        BridgeError::PlatformUnavailable => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Plain-text error carrying the verbatim message the browser shows the user.
fn error_response(err: &BridgeError) -> Response {
    let status = error_status(err);
    debug!(%status, error = %err, "request failed");
    (status, err.to_string()).into_response()
}
