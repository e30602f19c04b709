#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use account_relay::common::json_guard::JsonLimits;
use account_relay::observability::{
    LogLevel, OperationContext, RejectionStats, StructuredLogger, TracingTracer,
};
use account_relay::publisher::{AccountEnvelope, Publisher, Transport, TransportError};
use account_relay::translator::Translator;

pub const ACCOUNT_ID: &str = "6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f";

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub source: String,
    pub operation: String,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }
}

impl StructuredLogger for RecordingLogger {
    fn log(
        &self,
        level: LogLevel,
        source: &str,
        operation: &str,
        message: &str,
        error: Option<&(dyn Error + 'static)>,
    ) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            source: source.to_string(),
            operation: operation.to_string(),
            message: message.to_string(),
            error: error.map(|e| e.to_string()),
        });
    }
}

/// Keeps every envelope it is handed.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<AccountEnvelope>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<AccountEnvelope> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn publish(
        &self,
        envelope: AccountEnvelope,
        _cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(envelope);
        Ok(())
    }
}

/// Fails every send and counts the attempts.
#[derive(Default)]
pub struct FailingTransport {
    attempts: AtomicUsize,
}

impl FailingTransport {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FailingTransport {
    async fn publish(
        &self,
        _envelope: AccountEnvelope,
        _cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Closed)
    }
}

pub struct Harness {
    pub logger: Arc<RecordingLogger>,
    pub stats: Arc<RejectionStats>,
    pub translator: Translator,
}

pub fn harness() -> Harness {
    harness_with_limits(JsonLimits::default())
}

pub fn harness_with_limits(limits: JsonLimits) -> Harness {
    let logger = Arc::new(RecordingLogger::default());
    let stats = Arc::new(RejectionStats::new());
    let translator = Translator::new(logger.clone(), Arc::new(TracingTracer), stats.clone(), limits);
    Harness {
        logger,
        stats,
        translator,
    }
}

pub fn publisher_with(
    transport: Arc<dyn Transport>,
    logger: Arc<RecordingLogger>,
    stats: Arc<RejectionStats>,
) -> Publisher {
    Publisher::new(
        transport,
        logger,
        Arc::new(TracingTracer),
        stats,
        "account.changed",
    )
}

pub fn ctx() -> OperationContext {
    OperationContext::new("corr-1", "trace-1")
}

pub fn payload(changed_fields: &[&str], event_type: &str) -> Value {
    json!({
        "AccountId": ACCOUNT_ID,
        "AccountName": "Acme GmbH",
        "AccountType": "Customer",
        "ReplayId": "000123",
        "EventType": event_type,
        "Source": "Salesforce",
        "Publisher": "cdc-listener",
        "ChangedFields": changed_fields,
        "LastModifiedDate": "2024-05-01T08:30:00Z",
        "BillingAddress": {
            "Street": "Hauptstr. 1",
            "City": "Berlin",
            "PostalCode": "10115",
            "Country": "DE",
            "InvoiceEmail": "billing@acme.example"
        },
        "PrimaryContact": {
            "FirstName": "Ada",
            "LastName": "Lovelace",
            "Email": "ada@acme.example"
        }
    })
}

pub fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}
