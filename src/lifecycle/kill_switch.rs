//! Remote-triggered process termination.
//!
//! `GET /kill` simulates a crashing workload so restart policies and
//! self-healing can be exercised. The handler only schedules the exit; the
//! response goes out straight away and the process dies after the configured
//! delay, racing whatever else is in flight.
//!
//! The route carries no authentication. It is mounted only while
//! `kill_switch.enabled` is set.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode};
use tokio::task::JoinHandle;

use crate::http::server::AppState;
use crate::observability::metrics;

/// The process exit primitive.
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits the current process without running destructors or draining.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        tracing::warn!(exit_code = code, "Kill switch fired, exiting");
        std::process::exit(code);
    }
}

/// Submit a deferred termination to the runtime.
pub fn schedule(terminator: Arc<dyn Terminator>, delay: Duration, code: i32) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        terminator.terminate(code);
    })
}

/// `GET /kill`
pub async fn kill(State(state): State<AppState>) -> StatusCode {
    let settings = &state.config.kill_switch;
    let delay = Duration::from_millis(settings.delay_ms);

    tracing::warn!(
        delay_ms = settings.delay_ms,
        exit_code = settings.exit_code,
        "Kill switch triggered"
    );
    metrics::record_kill_scheduled();

    // Detached on purpose: the request must not wait for the exit.
    let _ = schedule(state.terminator.clone(), delay, settings.exit_code);

    StatusCode::ACCEPTED
}
