//! App wiring: driver ticks and ops endpoints.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use conduit_client::app_state::AppState;
use conduit_client::driver::Driver;
use conduit_client::obs::ClientMetrics;
use conduit_client::{config, router};

mod support;
use support::{spawn_stub, RecordingSink};

struct Fixture {
    _dir: tempfile::TempDir,
    concurrency: std::path::PathBuf,
    properties: std::path::PathBuf,
    state: AppState,
    sink: Arc<RecordingSink>,
}

fn fixture(base_url: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let concurrency = dir.path().join("common_concurrent_requests.txt");
    let properties = dir.path().join("conduit_config.properties");
    let yaml = format!(
        r#"
version: 1
client:
  base_url: "{base_url}"
  tick_interval_ms: 20
  concurrency_file: "{}"
settings:
  properties_file: "{}"
shutdown:
  drain_timeout_ms: 2000
"#,
        concurrency.display(),
        properties.display()
    );
    let cfg = config::load_from_str(&yaml).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let state = AppState::with_sink(cfg, sink.clone(), Arc::new(ClientMetrics::default())).unwrap();
    Fixture { _dir: dir, concurrency, properties, state, sink }
}

#[tokio::test]
async fn tick_polls_settings_and_dispatches() {
    let (url, stub) = spawn_stub(Duration::ZERO).await;
    let f = fixture(&url);
    std::fs::write(&f.concurrency, "2").unwrap();
    std::fs::write(&f.properties, "client.concurrency=2\nserver.processing.time=4\n").unwrap();

    let driver = Driver::new(f.state.clone());
    assert_eq!(driver.tick(), 2);

    std::fs::write(&f.properties, "client.concurrency=3\nserver.processing.time=1\n").unwrap();
    assert_eq!(driver.tick(), 2);

    f.state.dispatcher().drain().await;
    assert_eq!(stub.hits.load(Ordering::SeqCst), 4);
    assert_eq!(
        f.sink.texts(),
        vec![
            "client.concurrency increased to 3",
            "server.processing.time decreased to 1",
        ]
    );
}

#[tokio::test]
async fn run_stops_on_shutdown_and_marks_draining() {
    let (url, stub) = spawn_stub(Duration::ZERO).await;
    let f = fixture(&url);
    std::fs::write(&f.concurrency, "1").unwrap();

    let driver = Driver::new(f.state.clone());
    let aborted = driver.run(tokio::time::sleep(Duration::from_millis(150))).await;

    assert_eq!(aborted, 0);
    assert!(f.state.is_draining());
    assert!(stub.hits.load(Ordering::SeqCst) >= 1);
    assert_eq!(f.state.dispatcher().in_flight(), 0);
    assert_eq!(f.state.dispatcher().dispatch_batch(), 0);
}

async fn get(base: &str, path: &str) -> (u16, String) {
    let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.text().await.unwrap())
}

#[tokio::test]
async fn ops_endpoints_report_state() {
    let (url, _stub) = spawn_stub(Duration::ZERO).await;
    let f = fixture(&url);
    std::fs::write(&f.concurrency, "3").unwrap();
    f.state.dispatcher().dispatch_batch();
    f.state.dispatcher().drain().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ops = format!("http://{}", listener.local_addr().unwrap());
    let app = router::build_router(f.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    assert_eq!(get(&ops, "/healthz").await, (200, "ok".to_string()));
    assert_eq!(get(&ops, "/readyz").await, (200, "ready".to_string()));

    let (status, body) = get(&ops, "/metrics").await;
    assert_eq!(status, 200);
    assert!(body.contains("conduit_client_requests_concurrency 3"), "{body}");
    assert!(body.contains("conduit_client_requests_total{outcome=\"success\"} 3"), "{body}");
    assert!(body.contains("conduit_client_requests_in_flight 0"), "{body}");

    f.state.set_draining();
    assert_eq!(get(&ops, "/readyz").await, (503, "draining".to_string()));
}
