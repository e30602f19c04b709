use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::rejection::RejectionReason;

/// Running count of dropped payloads per rejection kind.
///
/// Rejections never escalate, so these counters are what lets an operator
/// notice a feed that started drifting away from the expected shape.
#[derive(Debug, Default)]
pub struct RejectionStats {
    counters: [AtomicU64; RejectionReason::ALL.len()],
}

impl RejectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one rejection and returns the updated total for that kind.
    pub fn record(&self, reason: RejectionReason) -> u64 {
        self.counters[reason.index()].fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self, reason: RejectionReason) -> u64 {
        self.counters[reason.index()].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.counters
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    pub fn snapshot(&self) -> Vec<(RejectionReason, u64)> {
        RejectionReason::ALL
            .iter()
            .map(|reason| (*reason, self.count(*reason)))
            .collect()
    }
}
