use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Structured log sink used by the translator and the publisher.
///
/// `source` names the component, `operation` the method inside it.
pub trait StructuredLogger: Send + Sync {
    fn log(
        &self,
        level: LogLevel,
        source: &str,
        operation: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    );

    fn info(&self, source: &str, operation: &str, message: &str) {
        self.log(LogLevel::Info, source, operation, message, None);
    }

    fn warn(&self, source: &str, operation: &str, message: &str) {
        self.log(LogLevel::Warn, source, operation, message, None);
    }

    fn error(
        &self,
        source: &str,
        operation: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) {
        self.log(LogLevel::Error, source, operation, message, error);
    }
}

/// Forwards every entry to the `tracing` subscriber installed by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StructuredLogger for TracingLogger {
    fn log(
        &self,
        level: LogLevel,
        source: &str,
        operation: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) {
        let detail = error.map(|e| e.to_string());
        let detail = detail.as_deref();
        match level {
            LogLevel::Info => {
                tracing::info!(source, operation, "[{}] {}", source, message)
            }
            LogLevel::Warn => {
                tracing::warn!(source, operation, error = detail, "[{}] {}", source, message)
            }
            LogLevel::Error => {
                tracing::error!(source, operation, error = detail, "[{}] {}", source, message)
            }
        }
    }
}
