//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, exit code non-zero)
//! - Check the collector endpoint is an HTTP URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("performance.max_delay_ms must be greater than zero")]
    ZeroMaxDelay,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("kill_switch.exit_code must be non-zero, a zero exit reads as a clean shutdown")]
    ZeroExitCode,

    #[error("metrics address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("tracing.service_name must not be empty")]
    EmptyServiceName,

    #[error("collector endpoint '{0}' must be an http(s) URL")]
    InvalidCollectorEndpoint(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = config.listener.bind_address();
    if bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(bind));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.performance.max_delay_ms == 0 {
        errors.push(ValidationError::ZeroMaxDelay);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.kill_switch.exit_code == 0 {
        errors.push(ValidationError::ZeroExitCode);
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
    }

    let tracing = &config.tracing;
    if tracing.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
    let endpoint = &tracing.collector_endpoint;
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        errors.push(ValidationError::InvalidCollectorEndpoint(endpoint.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
