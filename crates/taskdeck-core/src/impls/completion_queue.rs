//! CompletionQueue - auto-complete 用の bounded hand-off queue
//!
//! # 実装詳細
//! - `tokio::sync::mpsc` の bounded channel（容量は起動時に固定）
//! - producer は `send_timeout` で待つ。タイムアウトしたら諦める（task 作成は失敗させない）
//! - consumer（worker）は N 本で 1 つの Receiver を `Mutex` 越しに共有
//! - close = producer 側の Sender を手放すこと。送信中の clone が全て終わった時点で
//!   channel が閉じ、worker には `None`（もう仕事はない）として見える

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tracing::{debug, warn};

use crate::domain::TaskId;
use crate::observability::CompletionStats;
use crate::ports::{CompletionSink, EnqueueOutcome};

/// Create a bounded completion queue.
///
/// # Panics
/// `capacity` must be non-zero (the builder validates this).
pub fn completion_queue(
    capacity: usize,
    enqueue_timeout: Duration,
    stats: Arc<CompletionStats>,
) -> (CompletionProducer, CompletionReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    let producer = CompletionProducer {
        shared: Arc::new(ProducerShared {
            sender: Mutex::new(Some(tx)),
            enqueue_timeout,
            stats,
        }),
    };
    let receiver = CompletionReceiver {
        rx: Arc::new(tokio::sync::Mutex::new(rx)),
    };
    (producer, receiver)
}

struct ProducerShared {
    /// `None` once the queue has been closed.
    sender: Mutex<Option<mpsc::Sender<TaskId>>>,
    enqueue_timeout: Duration,
    stats: Arc<CompletionStats>,
}

/// Producer handle. Cheap to clone; every clone sees `close()`.
#[derive(Clone)]
pub struct CompletionProducer {
    shared: Arc<ProducerShared>,
}

impl CompletionProducer {
    /// Hand `task_id` to the worker pool.
    ///
    /// Returns immediately when there is room, otherwise waits at most the
    /// enqueue timeout. Never returns an error: a full queue degrades to
    /// `Dropped` and the task simply does not get auto-completed.
    pub async fn enqueue(&self, task_id: TaskId) -> EnqueueOutcome {
        let stats = &self.shared.stats;

        // Sender を clone してからロックを外す（await をロック越しにしない）
        let Some(sender) = self.current_sender() else {
            stats.record_rejected();
            debug!(task_id = %task_id, "completion queue closed, not scheduling auto-complete");
            return EnqueueOutcome::Closed;
        };

        match sender.send_timeout(task_id, self.shared.enqueue_timeout).await {
            Ok(()) => {
                stats.record_enqueued();
                debug!(task_id = %task_id, "auto-complete scheduled");
                EnqueueOutcome::Enqueued
            }
            Err(SendTimeoutError::Timeout(_)) => {
                stats.record_dropped();
                warn!(
                    task_id = %task_id,
                    timeout_ms = self.shared.enqueue_timeout.as_millis() as u64,
                    "deferred-completion skipped: completion queue full"
                );
                EnqueueOutcome::Dropped
            }
            Err(SendTimeoutError::Closed(_)) => {
                stats.record_rejected();
                debug!(task_id = %task_id, "completion queue closed while enqueueing");
                EnqueueOutcome::Closed
            }
        }
    }

    /// Stop accepting new requests.
    ///
    /// Already-running `enqueue` calls finish (bounded by the enqueue timeout);
    /// the channel closes when the last of them returns.
    pub fn close(&self) {
        let sender = self
            .shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn current_sender(&self) -> Option<mpsc::Sender<TaskId>> {
        self.shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionSink for CompletionProducer {
    async fn submit(&self, task_id: TaskId) -> EnqueueOutcome {
        self.enqueue(task_id).await
    }
}

/// Consumer handle shared by all workers.
#[derive(Clone)]
pub struct CompletionReceiver {
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<TaskId>>>,
}

impl CompletionReceiver {
    /// Next request, or `None` once the queue is closed and drained.
    ///
    /// Cancel safe: dropping the future never loses a request.
    pub async fn recv(&self) -> Option<TaskId> {
        self.rx.lock().await.recv().await
    }

    /// Take a request without waiting.
    ///
    /// `None` when the queue is empty or a worker is currently inside `recv`.
    pub fn try_recv(&self) -> Option<TaskId> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}
