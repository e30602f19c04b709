use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::transport::{AccountEnvelope, Transport, TransportError};

/// Writes every envelope as one JSON line to the wrapped writer.
pub struct LineTransport<W> {
    writer: Mutex<W>,
}

impl<W> LineTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl LineTransport<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> Transport for LineTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn publish(
        &self,
        envelope: AccountEnvelope,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        // Cancellation is only honoured before the first byte goes out; a
        // half-written line would corrupt the stream for the next envelope.
        let mut writer = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            writer = self.writer.lock() => writer,
        };
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}
