//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (request spans exported to a collector)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Distributed tracing (optional, OTLP collector)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span
//! - Tracing is off by default; when on, spans are exported in batches so
//!   handlers never wait on the collector
//! - The tracer reports its own problems on stdout, not through the logger,
//!   so it can be built before the logger exists

pub mod logging;
pub mod metrics;
pub mod tracing;

use thiserror::Error;

/// Errors raised while wiring telemetry at startup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("span exporter setup failed: {0}")]
    Exporter(String),

    #[error("metrics exporter setup failed: {0}")]
    Metrics(String),
}
