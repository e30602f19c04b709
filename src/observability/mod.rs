pub mod context;
pub mod logger;
pub mod stats;
pub mod tracer;

pub use context::OperationContext;
pub use logger::{LogLevel, StructuredLogger, TracingLogger};
pub use stats::RejectionStats;
pub use tracer::{Tracer, TracingTracer};
