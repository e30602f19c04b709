use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const HEADER_TRACE_ID: &str = "TraceId";
pub const HEADER_CORRELATION_ID: &str = "CorrelationId";

/// Transport-level wrapper around an outgoing message.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub v: u8,
    pub id: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(topic: &str, body: T) -> Self {
        Self {
            v: 1,
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
