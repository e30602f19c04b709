use futures_util::StreamExt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::observability::OperationContext;
use crate::pipeline::{AccountChangePipeline, PipelineOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub received: u64,
    pub handed_off: u64,
    pub skipped: u64,
    pub discarded_lines: u64,
}

/// Newline-delimited payload source for local runs and replays.
///
/// Each non-blank line is one CDC notification and gets its own freshly
/// minted [`OperationContext`].
pub struct LineFeed {
    max_line_bytes: usize,
}

impl LineFeed {
    pub fn new(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }

    pub async fn run<R>(
        &self,
        reader: R,
        pipeline: &AccountChangePipeline,
        cancel: &CancellationToken,
    ) -> FeedSummary
    where
        R: AsyncRead + Unpin,
    {
        let mut lines =
            FramedRead::new(reader, LinesCodec::new_with_max_length(self.max_line_bytes));
        let mut summary = FeedSummary::default();
        // FramedRead yields a single None right after a decode error and then
        // resumes, so that None is not end of input.
        let mut resume_after_error = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[Feed] Cancelled, stopping");
                    break;
                }
                next = lines.next() => next,
            };

            let line = match next {
                None if resume_after_error => {
                    resume_after_error = false;
                    continue;
                }
                None => break,
                Some(Ok(line)) => {
                    resume_after_error = false;
                    line
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    resume_after_error = true;
                    summary.discarded_lines += 1;
                    warn!(
                        "[Feed] Discarded payload longer than {} bytes",
                        self.max_line_bytes
                    );
                    continue;
                }
                Some(Err(LinesCodecError::Io(e))) if e.kind() == io::ErrorKind::InvalidData => {
                    resume_after_error = true;
                    summary.discarded_lines += 1;
                    warn!("[Feed] Discarded undecodable payload: {}", e);
                    continue;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    error!("[Feed] Failed to read payload: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            summary.received += 1;
            let ctx = OperationContext::generate();
            match pipeline.handle(&ctx, line.as_bytes(), cancel).await {
                PipelineOutcome::HandedOff => summary.handed_off += 1,
                PipelineOutcome::Skipped(_) => summary.skipped += 1,
            }
        }

        summary
    }
}
