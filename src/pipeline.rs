use tokio_util::sync::CancellationToken;

use crate::common::rejection::RejectionReason;
use crate::observability::OperationContext;
use crate::publisher::Publisher;
use crate::translator::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The event reached the transport. Whether the send itself succeeded is
    /// the publisher's concern and has already been logged.
    HandedOff,
    /// Translation rejected the payload; it is dropped.
    Skipped(RejectionReason),
}

/// Translator followed by publisher, one payload at a time.
pub struct AccountChangePipeline {
    translator: Translator,
    publisher: Publisher,
}

impl AccountChangePipeline {
    pub fn new(translator: Translator, publisher: Publisher) -> Self {
        Self {
            translator,
            publisher,
        }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub async fn handle(
        &self,
        ctx: &OperationContext,
        payload: &[u8],
        cancel: &CancellationToken,
    ) -> PipelineOutcome {
        match self.translator.translate(ctx, payload) {
            Ok(event) => {
                self.publisher.publish(event, cancel).await;
                PipelineOutcome::HandedOff
            }
            Err(reason) => PipelineOutcome::Skipped(reason),
        }
    }
}
