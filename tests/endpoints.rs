//! End-to-end behaviour of the HTTP surface against a bound server.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use metaphor::config::{ServiceConfig, StaticEnv};
use metaphor::simulation::PerformanceReport;

mod common;

fn deployment_env() -> StaticEnv {
    StaticEnv::new()
        .with("CHART_VERSION", "0.0.1")
        .with("DOCKER_TAG", "8f2c1e0")
        .with("SECRET_ONE", "development secret 1")
        .with("SECRET_TWO", "development secret 2")
        .with("CONFIG_ONE", "your-first-config")
        .with("CONFIG_TWO", "your-second-config")
}

#[tokio::test]
async fn test_healthz_is_fixed_for_any_method() {
    let (state, _) = common::test_state(ServiceConfig::default(), StaticEnv::new());
    let (addr, shutdown) = common::start_server(state).await;
    let client = common::client();
    let url = format!("http://{addr}/healthz");

    let mut bodies = Vec::new();
    for request in [client.get(&url), client.post(&url).body("ignored"), client.get(&url)] {
        let res = request.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        bodies.push(res.text().await.unwrap());
    }

    assert_eq!(bodies[0], r#"{"status":"ok"}"#);
    assert!(bodies.iter().all(|b| *b == bodies[0]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_index_renders_injected_values() {
    let (state, _) = common::test_state(ServiceConfig::default(), deployment_env());
    let (addr, shutdown) = common::start_server(state).await;
    let client = common::client();

    let first = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
    let page = first.text().await.unwrap();

    for expected in [
        "0.0.1",
        "Running",
        "app_name: metaphor",
        "your-first-config",
        "your-second-config",
        "SECRET_ONE: development secret 1",
        "development secret 2",
    ] {
        assert!(page.contains(expected), "missing {expected:?}");
    }

    let second = client.get(format!("http://{addr}/")).send().await.unwrap().text().await.unwrap();
    assert_eq!(page, second);

    shutdown.trigger();
}

#[tokio::test]
async fn test_index_blanks_unset_values() {
    let env = StaticEnv::new().with("SECRET_ONE", "only this one");
    let (state, _) = common::test_state(ServiceConfig::default(), env);
    let (addr, shutdown) = common::start_server(state).await;

    let page = common::client()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("SECRET_ONE: only this one"));
    assert!(page.contains("SECRET_TWO: </p>"));
    assert!(page.contains("CONFIG_ONE: </p>"));
    assert!(page.contains("chart_version: </p>"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_performance_reports_the_delay_it_applied() {
    let (state, _) = common::test_state(ServiceConfig::default(), StaticEnv::new());
    let (addr, shutdown) = common::start_server(state).await;
    let client = common::client();

    for _ in 0..3 {
        let start = Instant::now();
        let res = client.get(format!("http://{addr}/performance")).send().await.unwrap();
        let elapsed = start.elapsed();
        assert_eq!(res.status(), StatusCode::OK);

        let report: PerformanceReport = res.json().await.unwrap();
        assert_eq!(report.hello, "world");
        assert!(report.sleep_time < 2000);
        assert!(elapsed >= Duration::from_millis(report.sleep_time));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_performance_survives_missing_aux_file() {
    let mut config = ServiceConfig::default();
    config.performance.aux_file = "/nonexistent/metaphor/test.txt".into();
    config.performance.max_delay_ms = 50;
    let (state, _) = common::test_state(config, StaticEnv::new());
    let (addr, shutdown) = common::start_server(state).await;

    let res = common::client()
        .get(format!("http://{addr}/performance"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: PerformanceReport = res.json().await.unwrap();
    assert!(report.sleep_time < 50);

    shutdown.trigger();
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_performance_does_not_wait_on_a_stuck_aux_file() {
    // Opening a FIFO for reading blocks until a writer shows up.
    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("aux.fifo");
    let made = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
    assert!(made.success());

    let mut config = ServiceConfig::default();
    config.performance.aux_file = fifo.clone();
    config.performance.max_delay_ms = 10;
    config.timeouts.request_secs = 3;
    let (state, _) = common::test_state(config, StaticEnv::new());
    let (addr, shutdown) = common::start_server(state).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{addr}/performance"))
        .send()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(res.status(), StatusCode::OK);
    let report: PerformanceReport = res.json().await.unwrap();
    assert!(report.sleep_time < 10);
    assert!(elapsed < Duration::from_secs(1), "response waited on the read: {elapsed:?}");

    // Release the pending reader so the blocking pool can drain.
    tokio::task::spawn_blocking(move || {
        let _ = std::fs::OpenOptions::new().write(true).open(&fifo);
    })
    .await
    .unwrap();

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_performance_calls_do_not_serialize() {
    let (state, _) = common::test_state(ServiceConfig::default(), StaticEnv::new());
    let (addr, shutdown) = common::start_server(state).await;
    let client = common::client();

    let start = Instant::now();
    let mut calls = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = format!("http://{addr}/performance");
        calls.spawn(async move {
            let report: PerformanceReport = client.get(url).send().await.unwrap().json().await.unwrap();
            (report.sleep_time, start.elapsed())
        });
    }

    let mut results = Vec::new();
    while let Some(done) = calls.join_next().await {
        results.push(done.unwrap());
    }

    assert_eq!(results.len(), 8);
    for (sleep_time, elapsed) in &results {
        assert!(*sleep_time < 2000);
        assert!(*elapsed >= Duration::from_millis(*sleep_time));
        // Each call finishes close to its own delay, not after the others'.
        assert!(*elapsed < Duration::from_millis(sleep_time + 1000), "{sleep_time}ms call took {elapsed:?}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_responses_are_gzip_when_asked() {
    let (state, _) = common::test_state(ServiceConfig::default(), deployment_env());
    let (addr, shutdown) = common::start_server(state).await;

    let res = common::client()
        .get(format!("http://{addr}/"))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-encoding"], "gzip");

    shutdown.trigger();
}
