// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Integration tests for the HTTP API, driven through the router with a fake
//! print backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use graham_bridge::PrintBackend;
use graham_core::error::{BridgeError, Result};
use graham_core::types::JobEvent;
use graham_print::{JobJournal, PrintService, TEST_PAGE};
use graham_server::{AppStateInner, router};
use http_body_util::BodyExt; // for .collect().await and .frame().await
use serde_json::json;
use tokio::sync::watch;
use tower::util::ServiceExt; // for `oneshot`

const EMBOSSER: &str = "Index_Everest";

/// Accepts jobs for one queue and rejects the rest the way `lp` does.
struct FakeBackend {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl PrintBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn send(&self, printer: &str, data: &[u8]) -> Result<()> {
        if printer != EMBOSSER {
            return Err(BridgeError::CommandFailed {
                command: "lp".into(),
                status: "exit status: 1".into(),
                output: "lp: The printer or class does not exist.".into(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((printer.to_string(), data.to_vec()));
        Ok(())
    }

    fn list_printers(&self) -> Result<Vec<String>> {
        Ok(vec![EMBOSSER.to_string(), "Office_Laser".to_string()])
    }
}

struct Harness {
    app: Router,
    backend: Arc<FakeBackend>,
    journal: Arc<JobJournal>,
    shutdown: watch::Sender<bool>,
}

fn harness() -> Harness {
    let backend = Arc::new(FakeBackend {
        sent: Mutex::new(Vec::new()),
    });
    let journal = Arc::new(JobJournal::new(200, 8));
    let service = PrintService::new(backend.clone(), journal.clone());
    let (shutdown, shutdown_rx) = watch::channel(false);
    let app = router(AppStateInner::new(service, shutdown_rx));
    Harness {
        app,
        backend,
        journal,
        shutdown,
    }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn print(app: &Router, printer: &str, payload: &[u8]) -> axum::response::Response {
    let body = json!({ "printer": printer, "data": STANDARD.encode(payload) });
    app.clone().oneshot(post_json("/print", body)).await.unwrap()
}

#[tokio::test]
async fn status_is_idempotent_and_records_nothing() {
    let h = harness();
    for _ in 0..3 {
        let response = h.app.clone().oneshot(get("/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, json!({ "status": "ok" }));
    }
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn successful_print_returns_empty_ok_and_records_event() {
    let h = harness();
    let brf = b",a brl test\r\n";
    let response = print(&h.app, EMBOSSER, brf).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());

    let events = h.journal.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bytes, brf.len());
    assert_eq!(events[0].brf_text, ",a brl test\r\n");
    assert!(events[0].error.is_empty());
    let sent = h.backend.sent.lock().unwrap();
    assert_eq!(sent[0], (EMBOSSER.to_string(), brf.to_vec()));
}

#[tokio::test]
async fn multi_megabyte_job_reaches_the_backend() {
    let h = harness();
    // About 3.3 MB once base64-encoded, past axum's default body limit.
    let book: Vec<u8> = b",a l;g brl book\r\n".iter().copied().cycle().take(2_500_000).collect();
    let response = print(&h.app, EMBOSSER, &book).await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = h.journal.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bytes, book.len());
    assert!(events[0].error.is_empty());
    assert_eq!(h.backend.sent.lock().unwrap()[0].1.len(), book.len());
}

#[tokio::test]
async fn missing_printer_is_rejected_without_an_event() {
    let h = harness();
    let response = print(&h.app, "   ", b"abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "printer name required");
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn bad_base64_is_rejected_without_an_event() {
    let h = harness();
    let body = json!({ "printer": EMBOSSER, "data": "***not base64***" });
    let response = h.app.clone().oneshot(post_json("/print", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.starts_with("invalid base64 data"));
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/print")
        .body(Body::from("{\"printer\":"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn empty_payload_is_accepted() {
    let h = harness();
    let response = print(&h.app, EMBOSSER, b"").await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = h.journal.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bytes, 0);
    assert!(events[0].brf_text.is_empty());
}

#[tokio::test]
async fn unknown_printer_fails_and_is_recorded() {
    let h = harness();
    let response = print(&h.app, "Nope", b"hello").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.contains("does not exist"), "got {text}");

    let events = h.journal.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].printer, "Nope");
    assert_eq!(events[0].bytes, 5);
    assert!(events[0].error.contains("does not exist"));
}

#[tokio::test]
async fn test_print_sends_the_fixed_page() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(post_json("/testprint", json!({ "printer": EMBOSSER })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, json!({ "status": "queued" }));

    let events = h.journal.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bytes, TEST_PAGE.len());
    assert_eq!(events[0].bytes, 90);
}

#[tokio::test]
async fn test_print_without_printer_is_rejected() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(post_json("/testprint", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn concurrent_prints_get_distinct_ids() {
    let h = harness();
    let (a, b) = tokio::join!(
        print(&h.app, EMBOSSER, b"first"),
        print(&h.app, EMBOSSER, b"second")
    );
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    let mut ids: Vec<u64> = h.journal.snapshot().iter().map(|e| e.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn printers_lists_backend_queues() {
    let h = harness();
    let response = h.app.clone().oneshot(get("/printers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let names: Vec<String> = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(names, vec![EMBOSSER.to_string(), "Office_Laser".to_string()]);
}

#[tokio::test]
async fn log_stream_replays_history_then_streams_live() {
    let h = harness();
    for payload in [&b"one"[..], b"two", b"three"] {
        print(&h.app, EMBOSSER, payload).await;
    }

    let response = h.app.clone().oneshot(get("/log-stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    let mut body = response.into_body();

    let mut events: Vec<JobEvent> = Vec::new();
    let mut buffer = String::new();
    let mut sent_live = false;
    while events.len() < 4 {
        if events.len() == 3 && !sent_live {
            print(&h.app, EMBOSSER, b"four").await;
            sent_live = true;
        }
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("log stream stalled")
            .expect("log stream ended")
            .unwrap();
        let Ok(data) = frame.into_data() else { continue };
        buffer.push_str(std::str::from_utf8(&data).unwrap());
        while let Some(end) = buffer.find("\n\n") {
            let block: String = buffer.drain(..end + 2).collect();
            for line in block.lines() {
                if let Some(json) = line.strip_prefix("data:") {
                    events.push(serde_json::from_str(json.trim_start()).unwrap());
                }
            }
        }
    }

    let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(events[3].brf_text, "four");
    assert_eq!(h.journal.subscriber_count(), 1);

    drop(body);
    assert_eq!(h.journal.subscriber_count(), 0);
}

#[tokio::test]
async fn log_stream_ends_on_shutdown() {
    let h = harness();
    let response = h.app.clone().oneshot(get("/log-stream")).await.unwrap();
    let mut body = response.into_body();

    h.shutdown.send(true).unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("log stream ignored shutdown");
    assert!(next.is_none());
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let h = harness();
    let response = h.app.clone().oneshot(get("/status")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn preflight_gets_no_content() {
    let h = harness();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/print")
        .header("origin", "https://editor.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(h.journal.is_empty());
}

#[tokio::test]
async fn root_serves_the_console() {
    let h = harness();
    let response = h.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(body_text(response).await.contains("Graham Bridge"));
}
