//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, trace spans, fault reporting, timeout,
//!   compression, body limit, metrics)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{EnvSource, ProcessEnv, ServiceConfig};
use crate::health;
use crate::http::middleware::{panic_layer, report_errors};
use crate::lifecycle::kill_switch::{self, ProcessExit, Terminator};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::simulation;
use crate::views;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub env: Arc<dyn EnvSource>,
    pub terminator: Arc<dyn Terminator>,
}

impl AppState {
    /// State backed by the process environment and the real exit primitive.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            env: Arc::new(ProcessEnv),
            terminator: Arc::new(ProcessExit),
        }
    }

    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }
}

/// HTTP server for the reference service.
pub struct HttpServer {
    router: Router,
    config: Arc<ServiceConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_state(AppState::new(config))
    }

    /// Create a server over prepared state (tests inject env and terminator here).
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let router = build_router(state);
        Self { router, config }
    }

    /// A clone of the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.app.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::recv(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layers added later wrap the earlier ones, so the list below reads from
/// innermost to outermost.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .route("/", get(views::index))
        .route("/healthz", any(health::status))
        .route("/performance", get(simulation::performance));

    if config.kill_switch.enabled {
        router = router.route("/kill", get(kill_switch::kill));
    } else {
        tracing::info!("Kill switch disabled, /kill not mounted");
    }

    if let Some(dir) = &config.app.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    let mut router = router
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_requests));

    let verbose = !config.app.is_production();
    if verbose {
        router = router.layer(middleware::from_fn(report_errors));
    }

    router
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.timeouts.request_secs),
        ))
        .layer(panic_layer(verbose))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// One span per request; exported as the request's trace span when the
/// OpenTelemetry layer is installed.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        otel.name = %format!("{} {}", request.method(), request.uri().path()),
        otel.kind = "server",
    )
}
