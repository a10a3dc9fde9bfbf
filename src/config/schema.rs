//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the reference service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Application identity and deployment tier.
    pub app: AppConfig,

    /// Latency simulation settings.
    pub performance: PerformanceConfig,

    /// Remote-triggered termination settings.
    pub kill_switch: KillSwitchConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Distributed tracing settings.
    pub tracing: TracingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// TCP port. Overridden by `PORT`.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` pair handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Application identity rendered on the index page.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application name.
    pub name: String,

    /// Owning organization.
    pub company: String,

    /// Deployment tier. Overridden by `ENVIRONMENT`.
    pub environment: String,

    /// Optional directory served for paths no route matches.
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Verbose error reporting is disabled only in production.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "metaphor".to_string(),
            company: "kubefirst".to_string(),
            environment: "development".to_string(),
            static_dir: None,
        }
    }
}

/// Latency simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Exclusive upper bound of the simulated delay in milliseconds.
    pub max_delay_ms: u64,

    /// Auxiliary file read (best effort) on every call.
    pub aux_file: PathBuf,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: 2000,
            aux_file: PathBuf::from("test.txt"),
        }
    }
}

/// Kill switch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KillSwitchConfig {
    /// Mount `/kill`. When false the route does not exist.
    pub enabled: bool,

    /// Delay between accepting the call and exiting, in milliseconds.
    pub delay_ms: u64,

    /// Process exit code. Must be non-zero.
    pub exit_code: i32,
}

impl Default for KillSwitchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 3000,
            exit_code: 1,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Console output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Distributed tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TracingConfig {
    /// Export request spans to the collector.
    pub enabled: bool,

    /// `service.name` resource tag.
    pub service_name: String,

    /// OTLP/HTTP traces endpoint.
    pub collector_endpoint: String,

    /// Constant sampling decision: sample everything or nothing.
    pub const_sample: bool,

    /// Per-export timeout in seconds.
    pub export_timeout_secs: u64,

    /// Report every finished span on the tracer's console.
    pub log_spans: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "metaphor".to_string(),
            collector_endpoint: "http://jaeger-operator-jaeger-collector:4318/v1/traces".to_string(),
            const_sample: true,
            export_timeout_secs: 10,
            log_spans: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_keeps_defaults() {
        let config: ServiceConfig = toml::from_str("[listener]\nport = 8080\n").unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.bind_host, "0.0.0.0");
        assert_eq!(config.performance.max_delay_ms, 2000);
        assert!(config.kill_switch.enabled);
        assert!(!config.tracing.enabled);
    }

    #[test]
    fn test_log_format_is_lowercase() {
        let config: ServiceConfig =
            toml::from_str("[observability]\nlog_format = \"json\"\n").unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_production_detection() {
        let mut app = AppConfig::default();
        assert!(!app.is_production());
        app.environment = "Production".into();
        assert!(app.is_production());
    }
}
