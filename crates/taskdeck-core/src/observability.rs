//! Counters for the auto-complete pipeline.
//!
//! Every outcome of the error taxonomy ends up in exactly one counter, so a
//! snapshot explains where each Completion Request went.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters shared by producers and workers.
#[derive(Debug, Default)]
pub struct CompletionStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    not_applicable: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
    discarded: AtomicU64,
}

impl CompletionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_applicable(&self) {
        self.not_applicable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CompletionCounts {
        CompletionCounts {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            not_applicable: self.not_applicable.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CompletionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCounts {
    /// Accepted by the queue.
    pub enqueued: u64,
    /// Enqueue timed out on a full queue.
    pub dropped: u64,
    /// Submitted after shutdown started.
    pub rejected: u64,
    pub completed: u64,
    /// Task was already completed or gone when the delay fired.
    pub not_applicable: u64,
    /// Task store returned an error.
    pub failed: u64,
    /// Delay interrupted by shutdown.
    pub abandoned: u64,
    /// Still queued when the workers stopped; never picked up.
    pub discarded: u64,
}

impl CompletionCounts {
    /// Enqueued requests that have reached a final outcome.
    pub fn settled(&self) -> u64 {
        self.completed + self.not_applicable + self.failed + self.abandoned + self.discarded
    }
}
