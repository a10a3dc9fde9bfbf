//! Latency simulation.
//!
//! `GET /performance` stands in for a variable-latency downstream call so
//! autoscaling and latency monitoring have something to observe. Each call
//! draws its own delay, starts a detached read of an auxiliary file, waits
//! and reports the delay back so callers can correlate expected and observed
//! timing. The read never holds the response.

use std::path::Path;
use std::time::Duration;

use axum::{extract::State, Json};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Response body of `/performance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub hello: String,
    pub sleep_time: u64,
}

impl PerformanceReport {
    pub fn new(sleep_time: u64) -> Self {
        Self {
            hello: "world".to_string(),
            sleep_time,
        }
    }
}

/// Draw a delay uniformly from `[0, max_ms)`. `max_ms` of zero yields zero.
pub fn draw_delay(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..max_ms)
}

/// Read the auxiliary file and log the outcome. Never fails.
pub async fn read_aux_file(path: &Path) {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => tracing::info!(file = %path.display(), contents = %contents, "Auxiliary file read"),
        Err(e) => tracing::warn!(file = %path.display(), error = %e, "Auxiliary file unreadable"),
    }
}

/// `GET /performance`
pub async fn performance(State(state): State<AppState>) -> Json<PerformanceReport> {
    let settings = &state.config.performance;
    let sleep_time = draw_delay(settings.max_delay_ms);
    metrics::record_simulated_delay(sleep_time);

    let aux_file = settings.aux_file.clone();
    tokio::spawn(async move { read_aux_file(&aux_file).await });

    tokio::time::sleep(Duration::from_millis(sleep_time)).await;

    Json(PerformanceReport::new(sleep_time))
}
