mod common;

use account_relay::common::envelope::{HEADER_CORRELATION_ID, HEADER_TRACE_ID};
use account_relay::common::events::InternalAccountEvent;
use account_relay::common::rejection::RejectionReason;
use account_relay::observability::{LogLevel, RejectionStats};
use account_relay::publisher::{BusTransport, LineTransport, Transport, TransportError};
use common::{
    bytes, ctx, harness, payload, publisher_with, FailingTransport, RecordingLogger,
    RecordingTransport, ACCOUNT_ID,
};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

fn sample_event() -> InternalAccountEvent {
    let h = harness();
    let raw = payload(&["BillingAddress.Street"], "Updated");
    h.translator.translate(&ctx(), &bytes(&raw)).expect("event")
}

#[tokio::test]
async fn publish_attaches_trace_and_correlation_headers() {
    let transport = Arc::new(RecordingTransport::default());
    let logger = Arc::new(RecordingLogger::default());
    let publisher = publisher_with(
        transport.clone(),
        logger.clone(),
        Arc::new(RejectionStats::new()),
    );

    let event = sample_event();
    publisher
        .publish(event.clone(), &CancellationToken::new())
        .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].topic, "account.changed");
    assert_eq!(sent[0].header(HEADER_TRACE_ID), Some("trace-1"));
    assert_eq!(sent[0].header(HEADER_CORRELATION_ID), Some("corr-1"));
    assert_eq!(sent[0].body, event);
    assert!(logger.entries().is_empty());
}

#[tokio::test]
async fn failing_transport_is_logged_once_per_call() {
    let transport = Arc::new(FailingTransport::default());
    let logger = Arc::new(RecordingLogger::default());
    let stats = Arc::new(RejectionStats::new());
    let publisher = publisher_with(transport.clone(), logger.clone(), stats.clone());
    let cancel = CancellationToken::new();

    publisher.publish(sample_event(), &cancel).await;
    publisher.publish(sample_event(), &cancel).await;

    assert_eq!(transport.attempts(), 2);
    let errors = logger.at(LogLevel::Error);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains(ACCOUNT_ID));
    assert!(errors[0].message.starts_with("PublishFailed (#1)"));
    assert_eq!(errors[0].source, "AccountPublisher");
    assert_eq!(errors[0].error.as_deref(), Some("transport closed"));
    assert_eq!(stats.count(RejectionReason::PublishFailed), 2);
}

#[tokio::test]
async fn bus_delivers_to_topic_and_wildcard_subscribers() {
    let bus = Arc::new(BusTransport::new(4));
    let mut topic_rx = bus.subscribe("account.changed").await;
    let mut all_rx = bus.subscribe("*").await;
    let mut other_rx = bus.subscribe("contact.changed").await;
    let logger = Arc::new(RecordingLogger::default());
    let publisher = publisher_with(bus.clone(), logger.clone(), Arc::new(RejectionStats::new()));

    publisher
        .publish(sample_event(), &CancellationToken::new())
        .await;

    let delivered = topic_rx.recv().await.expect("topic subscriber");
    assert_eq!(delivered.body.account_id().to_string(), ACCOUNT_ID);
    assert!(all_rx.recv().await.is_some());
    assert!(other_rx.try_recv().is_err());
    assert!(logger.entries().is_empty());
}

#[tokio::test]
async fn bus_without_subscribers_is_unroutable() {
    let bus = BusTransport::new(1);
    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event());

    let err = bus
        .publish(envelope, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Unroutable(topic) if topic == "account.changed"));
}

#[tokio::test]
async fn bus_reports_closed_when_every_receiver_is_gone() {
    let bus = BusTransport::new(1);
    let rx = bus.subscribe("account.changed").await;
    drop(rx);

    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event());
    let err = bus
        .publish(envelope, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Closed));
}

#[tokio::test]
async fn cancelled_publish_is_logged_not_raised() {
    let bus = Arc::new(BusTransport::new(1));
    let _rx = bus.subscribe("account.changed").await;
    let logger = Arc::new(RecordingLogger::default());
    let stats = Arc::new(RejectionStats::new());
    let publisher = publisher_with(bus.clone(), logger.clone(), stats.clone());
    let cancel = CancellationToken::new();

    // first send fills the single slot, the second one would wait forever
    publisher.publish(sample_event(), &cancel).await;
    cancel.cancel();
    publisher.publish(sample_event(), &cancel).await;

    let errors = logger.at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error.as_deref(), Some("send cancelled"));
    assert_eq!(stats.count(RejectionReason::PublishFailed), 1);
}

#[tokio::test]
async fn line_transport_writes_one_json_line_per_envelope() {
    let transport = LineTransport::new(Vec::<u8>::new());
    let cancel = CancellationToken::new();
    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event())
        .with_header(HEADER_TRACE_ID, "trace-1");

    transport.publish(envelope.clone(), &cancel).await.expect("first");
    transport.publish(envelope, &cancel).await.expect("second");

    let written = String::from_utf8(transport.into_inner()).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["topic"], "account.changed");
    assert_eq!(value["headers"]["TraceId"], "trace-1");
    assert_eq!(value["body"]["AccountId"], ACCOUNT_ID);
    assert_eq!(value["body"]["ChangedBlocks"][0], "BillingAddress");
}

/// Takes at most ten bytes per call and stalls on every other call. The first
/// stall cancels the token it was given.
struct StallingWriter {
    written: Vec<u8>,
    cancel: CancellationToken,
    stall_next: bool,
}

impl AsyncWrite for StallingWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.stall_next {
            self.stall_next = false;
            self.cancel.cancel();
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        self.stall_next = true;
        let n = buf.len().min(10);
        self.written.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn line_transport_finishes_a_line_cancelled_mid_write() {
    let cancel = CancellationToken::new();
    let transport = LineTransport::new(StallingWriter {
        written: Vec::new(),
        cancel: cancel.clone(),
        stall_next: false,
    });
    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event());

    transport
        .publish(envelope.clone(), &cancel)
        .await
        .expect("started write completes");
    assert!(cancel.is_cancelled());

    let err = transport.publish(envelope.clone(), &cancel).await.unwrap_err();
    assert!(matches!(err, TransportError::Cancelled));

    transport
        .publish(envelope, &CancellationToken::new())
        .await
        .expect("fresh token");

    let written = String::from_utf8(transport.into_inner().written).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).expect("whole JSON line");
        assert_eq!(value["topic"], "account.changed");
    }
}

#[tokio::test]
async fn bus_prunes_dropped_subscribers_on_publish() {
    let bus = BusTransport::new(1);
    let gone = bus.subscribe("account.changed").await;
    let mut kept = bus.subscribe("*").await;
    drop(gone);
    let _orphan = bus.subscribe("contact.changed").await;
    assert_eq!(bus.topic_count().await, 3);

    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event());
    bus.publish(envelope, &CancellationToken::new())
        .await
        .expect("wildcard subscriber still listening");

    assert!(kept.recv().await.is_some());
    assert_eq!(bus.topic_count().await, 2);
    assert_eq!(bus.subscriber_count("account.changed").await, 0);
}

#[tokio::test]
async fn bus_topic_with_only_dropped_subscribers_becomes_unroutable() {
    let bus = BusTransport::new(1);
    drop(bus.subscribe("account.changed").await);

    let envelope = account_relay::common::envelope::Envelope::new("account.changed", sample_event());
    let first = bus
        .publish(envelope.clone(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(first, TransportError::Closed));

    let second = bus
        .publish(envelope, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(second, TransportError::Unroutable(_)));
    assert_eq!(bus.topic_count().await, 0);
}
