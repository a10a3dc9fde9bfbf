//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides: PORT, ENVIRONMENT (loader.rs + env.rs)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc to all handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Values rendered on the index page are not part of the config: they are
//!   read from the environment at request time

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{EnvSource, ProcessEnv, StaticEnv};
pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, KillSwitchConfig, ListenerConfig, LogFormat, ObservabilityConfig, PerformanceConfig,
    SecurityConfig, ServiceConfig, TimeoutConfig, TracingConfig,
};
pub use validation::ValidationError;
