use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use super::transport::{AccountEnvelope, Transport, TransportError};

const WILDCARD_TOPIC: &str = "*";

/// In-process topic bus. Each subscriber owns a bounded queue.
#[derive(Debug)]
pub struct BusTransport {
    subscriptions: RwLock<HashMap<String, Vec<mpsc::Sender<AccountEnvelope>>>>,
    queue_capacity: usize,
}

impl BusTransport {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Registers a subscriber for `topic` (`*` receives every topic).
    pub async fn subscribe(&self, topic: &str) -> mpsc::Receiver<AccountEnvelope> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let mut subs = self.subscriptions.write().await;
        let entry = subs.entry(topic.to_string()).or_default();
        entry.retain(|sender| !sender.is_closed());
        entry.push(tx);
        rx
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let subs = self.subscriptions.read().await;
        subs.get(topic)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    async fn prune_closed(&self) {
        let mut subs = self.subscriptions.write().await;
        subs.retain(|_, senders| {
            senders.retain(|sender| !sender.is_closed());
            !senders.is_empty()
        });
    }

    /// Number of topics with at least one registered sender, live or not.
    pub async fn topic_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    async fn targets(&self, topic: &str) -> Vec<mpsc::Sender<AccountEnvelope>> {
        let subs = self.subscriptions.read().await;
        let mut targets = Vec::new();
        for key in [topic, WILDCARD_TOPIC] {
            if let Some(senders) = subs.get(key) {
                targets.extend(senders.iter().cloned());
            }
        }
        targets
    }
}

#[async_trait]
impl Transport for BusTransport {
    async fn publish(
        &self,
        envelope: AccountEnvelope,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let targets = self.targets(&envelope.topic).await;
        if targets.is_empty() {
            return Err(TransportError::Unroutable(envelope.topic));
        }

        let mut delivered = 0usize;
        let mut saw_closed = false;
        for tx in targets {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                sent = tx.send(envelope.clone()) => {
                    if sent.is_ok() {
                        delivered += 1;
                    } else {
                        saw_closed = true;
                    }
                }
            }
        }
        if saw_closed {
            self.prune_closed().await;
        }

        if delivered == 0 {
            return Err(TransportError::Closed);
        }
        tracing::debug!(
            "[Bus] Envelope {} delivered to {} subscriber(s) on {}",
            envelope.id,
            delivered,
            envelope.topic
        );
        Ok(())
    }
}
