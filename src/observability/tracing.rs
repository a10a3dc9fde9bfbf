//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build a per-service tracer with a constant sampler
//! - Export spans to a fixed collector endpoint over OTLP/HTTP
//! - Bridge `tracing` spans (one per request) into OpenTelemetry
//! - Optionally report every finished span through the tracer's diagnostics
//!
//! # Design Decisions
//! - Export is batched on a background worker; request handling never waits
//!   on the collector and an unreachable collector never fails startup
//! - The tracer's own messages go through [`TracerDiagnostics`], a plain
//!   console adapter independent of the application logger

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

use crate::config::TracingConfig;
use crate::observability::TelemetryError;

/// The subscriber layer that turns `tracing` spans into exported spans.
pub type OtelLayer = OpenTelemetryLayer<Registry, SdkTracer>;

/// Leveled sink for the tracer's own diagnostics.
pub trait TracerDiagnostics: Send + Sync {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Writes `INFO  <msg>` and `ERROR <msg>` lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDiagnostics;

impl ConsoleDiagnostics {
    fn emit(level: &str, msg: &str) {
        // Diagnostics are best effort; a closed stdout is not our problem.
        let _ = writeln!(std::io::stdout().lock(), "{level} {msg}");
    }
}

impl TracerDiagnostics for ConsoleDiagnostics {
    fn info(&self, msg: &str) {
        Self::emit("INFO ", msg);
    }

    fn error(&self, msg: &str) {
        Self::emit("ERROR", msg);
    }
}

/// Reports each closed span as `reporting span '<name>' (<target>, <ms> ms)`
/// through [`TracerDiagnostics`].
#[derive(Clone)]
pub struct SpanLogLayer {
    diagnostics: Arc<dyn TracerDiagnostics>,
}

struct SpanOpened(Instant);

impl SpanLogLayer {
    pub fn new(diagnostics: Arc<dyn TracerDiagnostics>) -> Self {
        Self { diagnostics }
    }
}

impl<S> Layer<S> for SpanLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanOpened(Instant::now()));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let elapsed = span
            .extensions()
            .get::<SpanOpened>()
            .map(|opened| opened.0.elapsed())
            .unwrap_or_default();
        self.diagnostics.info(&format!(
            "reporting span '{}' ({}, {} ms)",
            span.name(),
            span.metadata().target(),
            elapsed.as_millis()
        ));
    }
}

/// A configured tracing client for one service.
pub struct Tracer {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
    service_name: String,
    log_spans: bool,
    diagnostics: Arc<dyn TracerDiagnostics>,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}

/// The constant sampling policy: everything or nothing.
pub fn const_sampler(sample: bool) -> Sampler {
    if sample {
        Sampler::AlwaysOn
    } else {
        Sampler::AlwaysOff
    }
}

/// Build a tracer for `config.service_name`.
///
/// Building does not contact the collector. Spans are queued and exported in
/// the background; export failures surface only through diagnostics.
pub fn init_tracer(
    config: &TracingConfig,
    diagnostics: Arc<dyn TracerDiagnostics>,
) -> Result<Tracer, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(config.collector_endpoint.clone())
        .with_timeout(Duration::from_secs(config.export_timeout_secs))
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();

    let provider = SdkTracerProvider::builder()
        .with_sampler(const_sampler(config.const_sample))
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    let tracer = provider.tracer(config.service_name.clone());

    diagnostics.info(&format!(
        "tracer initialized for service '{}' reporting to {} (const sampler: {}, log spans: {})",
        config.service_name, config.collector_endpoint, config.const_sample, config.log_spans
    ));

    Ok(Tracer {
        provider,
        tracer,
        service_name: config.service_name.clone(),
        log_spans: config.log_spans,
        diagnostics,
    })
}

impl Tracer {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The `tracing-subscriber` layer exporting spans through this tracer.
    pub fn layer(&self) -> OtelLayer {
        tracing_opentelemetry::layer().with_tracer(self.tracer.clone())
    }

    /// The span reporter, when `log_spans` is on.
    pub fn span_logger(&self) -> Option<SpanLogLayer> {
        self.log_spans
            .then(|| SpanLogLayer::new(self.diagnostics.clone()))
    }

    /// Flush queued spans and stop the exporter. Failures are reported, not returned.
    pub fn shutdown(self) {
        match self.provider.shutdown() {
            Ok(()) => self.diagnostics.info("tracer shut down"),
            Err(e) => self.diagnostics.error(&format!("tracer shutdown failed: {e}")),
        }
    }
}
