//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide `tracing` subscriber exactly once
//! - Select pretty or JSON console output
//! - Attach the OpenTelemetry layer and span reporter when tracing is enabled
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence over the configured level
//! - The fmt layer writes each event in one call, so concurrent handlers
//!   never interleave fields of a single record

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::tracing::{OtelLayer, SpanLogLayer};
use crate::observability::TelemetryError;

/// Build the level filter: `RUST_LOG` if set, otherwise the configured level
/// applied to this crate and `tower_http`.
pub fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directives = format!(
        "metaphor={level},tower_http={level}",
        level = config.log_level
    );
    EnvFilter::try_new(&directives).map_err(|e| TelemetryError::Filter {
        filter: directives,
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
    otel: Option<OtelLayer>,
    span_log: Option<SpanLogLayer>,
) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(otel)
        .with(span_log)
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_config() {
        let config = ObservabilityConfig {
            log_level: "debug".into(),
            ..Default::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = ObservabilityConfig::default();
        // The first call may lose to another test's subscriber; either way the
        // second one must report rather than panic.
        let _ = init_logging(&config, None, None);
        let second = init_logging(&config, None, None);
        assert!(matches!(second, Err(TelemetryError::AlreadyInitialized(_))));
    }
}
