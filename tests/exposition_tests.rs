//! Integration tests for the HTTP endpoints.
//!
//! The router is driven in-process; gauges are filled by a sampler reading a
//! fake /proc tree.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use common::{fixed_env, FakeProc, TEST_HOST};
use simple_metrics_exporter::handlers::{METRICS_CONTENT_TYPE, ROOT_TEXT};
use simple_metrics_exporter::sampler::Sampler;
use simple_metrics_exporter::server::build_router;
use simple_metrics_exporter::state::{AppState, SharedState};

const METRIC_NAMES: [&str; 7] = [
    "simple_dummy_metric",
    "system_cpu_usage_percent",
    "system_cpu_free_percent",
    "process_memory_rss_bytes",
    "system_memory_used_bytes",
    "system_disk_free_bytes",
    "system_load_avg_1min",
];

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

/// Finds the sample line of `name` (skipping HELP/TYPE comments).
fn sample_line<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    body.lines().find(|line| {
        !line.starts_with('#')
            && (line.starts_with(&format!("{name}{{")) || line.starts_with(&format!("{name} ")))
    })
}

fn sample_value(line: &str) -> f64 {
    line.rsplit(' ').next().unwrap().parse().unwrap()
}

fn sampled_state(fake: &FakeProc) -> SharedState {
    let state = AppState::shared().unwrap();
    let mut sampler =
        Sampler::new(state.metrics.clone(), &fake.config()).with_env_source(fixed_env());
    sampler.tick().unwrap();
    state
}

#[tokio::test]
async fn test_root_returns_fixed_text() {
    let state = AppState::shared().unwrap();
    let (status, _, body) = get(build_router(state), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Dynatrace test app - /metrics");
    assert_eq!(body, ROOT_TEXT);
}

#[tokio::test]
async fn test_metrics_before_first_tick() {
    let state = AppState::shared().unwrap();
    let (status, content_type, body) = get(build_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(METRICS_CONTENT_TYPE));
    assert_eq!(
        content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert!(sample_line(&body, "simple_dummy_metric").is_some());
}

#[tokio::test]
async fn test_metrics_after_tick_lists_all_series() {
    let fake = FakeProc::new();
    let state = sampled_state(&fake);
    let (status, content_type, body) = get(build_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(METRICS_CONTENT_TYPE));

    for name in METRIC_NAMES {
        let line = sample_line(&body, name).unwrap_or_else(|| panic!("{name} missing:\n{body}"));
        assert!(sample_value(line).is_finite(), "{line}");
        if name != "simple_dummy_metric" {
            assert!(line.contains(&format!("host=\"{TEST_HOST}\"")), "{line}");
            assert!(line.contains("env=\"dev\""), "{line}");
        }
    }

    assert!(body.contains("# HELP system_load_avg_1min System load average (1 min)"));
    assert!(body.contains("# TYPE system_cpu_usage_percent gauge"));
}

#[tokio::test]
async fn test_metrics_reflect_last_written_values() {
    let fake = FakeProc::new();
    let state = sampled_state(&fake);
    let router = build_router(state.clone());

    let (_, _, body) = get(router.clone(), "/metrics").await;
    let load = sample_line(&body, "system_load_avg_1min").unwrap();
    assert_eq!(sample_value(load), 0.52);

    let dummy = sample_value(sample_line(&body, "simple_dummy_metric").unwrap());
    assert!((39.0..=45.0).contains(&dummy));

    let usage = sample_value(sample_line(&body, "system_cpu_usage_percent").unwrap());
    let free = sample_value(sample_line(&body, "system_cpu_free_percent").unwrap());
    assert!((usage + free - 100.0).abs() < 1e-9);

    state.metrics.simple_dummy_metric.set(12.5);
    let (_, _, body) = get(router, "/metrics").await;
    assert_eq!(
        sample_line(&body, "simple_dummy_metric"),
        Some("simple_dummy_metric 12.5")
    );
}

#[tokio::test]
async fn test_metrics_still_served_after_sampling_failure() {
    let fake = FakeProc::new();
    let state = sampled_state(&fake);

    fake.remove("stat");
    let mut sampler =
        Sampler::new(state.metrics.clone(), &fake.config()).with_env_source(fixed_env());
    assert!(sampler.tick().is_err());

    let (status, content_type, body) = get(build_router(state), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(METRICS_CONTENT_TYPE));
    let load = sample_line(&body, "system_load_avg_1min").unwrap();
    assert_eq!(sample_value(load), 0.52);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let state = AppState::shared().unwrap();
    let (status, _, _) = get(build_router(state), "/health").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_serve_over_tcp() {
    let fake = FakeProc::new();
    let state = sampled_state(&fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(simple_metrics_exporter::server::serve(
        listener,
        build_router(state),
        async move {
            let _ = rx.await;
        },
    ));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
    assert!(raw
        .to_ascii_lowercase()
        .contains("content-type: text/plain; version=0.0.4; charset=utf-8"));
    assert!(raw.contains("system_disk_free_bytes{"));

    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
