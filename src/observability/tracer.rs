use tracing::field::Empty;
use tracing::Span;

/// Opens one span per traced operation.
///
/// Every span declares `correlation_id` and `trace_id` fields so callers can
/// record them once the context is known.
pub trait Tracer: Send + Sync {
    fn start_span(&self, operation: &str) -> Span;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, operation: &str) -> Span {
        tracing::info_span!(
            "operation",
            name = operation,
            correlation_id = Empty,
            trace_id = Empty
        )
    }
}
