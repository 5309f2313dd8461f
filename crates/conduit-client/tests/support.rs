//! Shared helpers: an in-process stub endpoint and a recording sink.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};

use conduit_client::annotate::AnnotationSink;
use conduit_client::transport::TIMESTAMP_HEADER;
use conduit_core::annotation::Annotation;

#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Annotation>>,
}

impl RecordingSink {
    pub fn texts(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|a| a.text.clone()).collect()
    }
}

impl AnnotationSink for RecordingSink {
    fn annotate(&self, annotation: Annotation) {
        self.seen.lock().unwrap().push(annotation);
    }
}

#[derive(Default)]
pub struct Stub {
    pub delay: Duration,
    pub hits: AtomicUsize,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub timestamps: Mutex<Vec<String>>,
    pub annotations: Mutex<Vec<serde_json::Value>>,
    pub auth: Mutex<Vec<String>>,
}

async fn hello(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> String {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let now = stub.active.fetch_add(1, Ordering::SeqCst) + 1;
    stub.max_active.fetch_max(now, Ordering::SeqCst);
    if let Some(ts) = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok()) {
        stub.timestamps.lock().unwrap().push(ts.to_string());
    }

    tokio::time::sleep(stub.delay).await;
    stub.active.fetch_sub(1, Ordering::SeqCst);
    "Hello, world".to_string()
}

async fn annotations(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    if let Some(a) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        stub.auth.lock().unwrap().push(a.to_string());
    }
    stub.annotations.lock().unwrap().push(body);
    StatusCode::OK
}

/// Serve `/hello` (slept by `delay`), `/fail` (500) and `/api/annotations`.
pub async fn spawn_stub(delay: Duration) -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub { delay, ..Stub::default() });
    let app = Router::new()
        .route("/hello", get(hello))
        .route("/fail", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route("/api/annotations", post(annotations))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

/// A base URL nothing listens on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
