use uuid::Uuid;

/// Correlation and trace identifiers of the operation a payload belongs to.
///
/// Minted by whoever receives the payload and passed down explicitly; the
/// translator copies the ids into the event it builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    correlation_id: Option<String>,
    trace_id: Option<String>,
}

impl OperationContext {
    pub fn new(correlation_id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            correlation_id: non_empty(correlation_id.into()),
            trace_id: non_empty(trace_id.into()),
        }
    }

    /// Fresh ids for a payload that arrived without any upstream context.
    pub fn generate() -> Self {
        Self {
            correlation_id: Some(Uuid::new_v4().to_string()),
            trace_id: Some(Uuid::new_v4().simple().to_string()),
        }
    }

    /// A context carrying no ids at all.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
