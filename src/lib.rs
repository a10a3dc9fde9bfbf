//! metaphor: a reference workload for validating platform behaviour.
//!
//! The service exists to be deployed and poked at: it renders injected
//! configuration and secrets on `/`, answers liveness probes on `/healthz`,
//! simulates variable latency on `/performance`, and crashes on demand via
//! `/kill`. Logging, metrics and (optionally) distributed tracing are wired
//! around every request.

// Core subsystems
pub mod config;
pub mod http;

// Handlers
pub mod health;
pub mod simulation;
pub mod views;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
