//! Liveness and readiness reporting.
//!
//! `/healthz` is what the orchestrator probes, so the handler reads no
//! state, touches no configuration, filesystem or network, and cannot fail.

use axum::Json;
use serde::Serialize;

/// Fixed health payload.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
}

impl HealthStatus {
    pub const OK: Self = Self { status: "ok" };
}

/// `/healthz`, any method.
pub async fn status() -> Json<HealthStatus> {
    Json(HealthStatus::OK)
}
