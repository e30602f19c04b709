pub mod bus;
pub mod line;
pub mod transport;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::common::envelope::{Envelope, HEADER_CORRELATION_ID, HEADER_TRACE_ID};
use crate::common::events::InternalAccountEvent;
use crate::common::rejection::RejectionReason;
use crate::observability::{RejectionStats, StructuredLogger, Tracer};

pub use bus::BusTransport;
pub use line::LineTransport;
pub use transport::{AccountEnvelope, Transport, TransportError};

const SOURCE: &str = "AccountPublisher";
const OPERATION: &str = "publish";
const OPERATION_NAME: &str = "AccountPublisher.publish";

/// Hands translated events to the transport.
///
/// Fire-and-log: a failed send is logged and counted, never returned to the
/// caller and never retried here.
pub struct Publisher {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn StructuredLogger>,
    tracer: Arc<dyn Tracer>,
    stats: Arc<RejectionStats>,
    topic: String,
}

impl Publisher {
    pub fn new(
        transport: Arc<dyn Transport>,
        logger: Arc<dyn StructuredLogger>,
        tracer: Arc<dyn Tracer>,
        stats: Arc<RejectionStats>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            logger,
            tracer,
            stats,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn publish(&self, event: InternalAccountEvent, cancel: &CancellationToken) {
        let span = self.tracer.start_span(OPERATION_NAME);
        span.record("correlation_id", event.correlation_id());
        span.record("trace_id", event.trace_id());

        let account_id = event.account_id();
        let envelope = Envelope::new(&self.topic, event);
        let trace_id = envelope.body.trace_id().to_string();
        let correlation_id = envelope.body.correlation_id().to_string();
        let envelope = envelope
            .with_header(HEADER_TRACE_ID, &trace_id)
            .with_header(HEADER_CORRELATION_ID, &correlation_id);

        async move {
            if let Err(err) = self.transport.publish(envelope, cancel).await {
                let count = self.stats.record(RejectionReason::PublishFailed);
                self.logger.error(
                    SOURCE,
                    OPERATION,
                    &format!(
                        "{} (#{}): Failed to publish message for AccountId={}: {}",
                        RejectionReason::PublishFailed,
                        count,
                        account_id,
                        err
                    ),
                    Some(&err),
                );
            }
        }
        .instrument(span)
        .await
    }
}
