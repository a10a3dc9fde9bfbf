//! metaphor reference service.
//!
//! # Startup
//!
//! ```text
//! parse CLI → load config (file + env) → build tracer (optional)
//!     → install logger → start runtime → metrics listener (optional)
//!     → bind port → serve until SIGINT/SIGTERM → flush tracer
//! ```
//!
//! The tracer and logger are set up before the Tokio runtime exists, so the
//! span exporter's blocking HTTP client is never created on a runtime thread.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use metaphor::config::{load_config, ProcessEnv, ServiceConfig};
use metaphor::lifecycle::{signals, Shutdown};
use metaphor::observability::tracing::{init_tracer, ConsoleDiagnostics, Tracer, TracerDiagnostics};
use metaphor::observability::{logging, metrics};
use metaphor::HttpServer;

#[derive(Parser)]
#[command(name = "metaphor")]
#[command(about = "Reference workload for platform validation", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "METAPHOR_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &ProcessEnv)?;

    let tracer = build_tracer(&config);
    logging::init_logging(
        &config.observability,
        tracer.as_ref().map(Tracer::layer),
        tracer.as_ref().and_then(Tracer::span_logger),
    )?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.app.environment,
        tracing_enabled = tracer.is_some(),
        "metaphor starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config));
    drop(runtime);

    if let Some(tracer) = tracer {
        tracer.shutdown();
    }
    result
}

/// Tracing is best effort: a failed exporter is reported and startup continues.
fn build_tracer(config: &ServiceConfig) -> Option<Tracer> {
    if !config.tracing.enabled {
        return None;
    }

    let diagnostics: Arc<dyn TracerDiagnostics> = Arc::new(ConsoleDiagnostics);
    match init_tracer(&config.tracing, diagnostics.clone()) {
        Ok(tracer) => Some(tracer),
        Err(e) => {
            diagnostics.error(&format!("tracing disabled: {e}"));
            None
        }
    }
}

async fn serve(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Metrics endpoint unavailable");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        "app is running at http://localhost:{} in {} mode",
        local_addr.port(),
        config.app.environment
    );
    tracing::info!("Press CTRL-C to stop");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = signals::wait_for_shutdown() => {
            shutdown.trigger();
            server_task.await??;
        }
        finished = &mut server_task => finished??,
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
