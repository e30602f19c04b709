use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::common::envelope::Envelope;
use crate::common::events::InternalAccountEvent;

pub type AccountEnvelope = Envelope<InternalAccountEvent>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send cancelled")]
    Cancelled,
    #[error("no subscriber for topic '{0}'")]
    Unroutable(String),
    #[error("transport closed")]
    Closed,
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Messaging primitive the publisher hands envelopes to.
///
/// Durability (outbox, retries, dead-lettering) belongs to the
/// implementation; callers send each envelope once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(
        &self,
        envelope: AccountEnvelope,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError>;
}
