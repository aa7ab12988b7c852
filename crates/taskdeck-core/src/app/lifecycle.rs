//! Lifecycle - auto-complete パイプラインの起動と停止
//!
//! `AutoCompleter` が queue・worker pool・shutdown signal をまとめて所有します。
//! 起動は [`AutoCompleterBuilder`](super::builder::AutoCompleterBuilder) 経由で 1 回、
//! 停止は [`AutoCompleter::shutdown`] で 1 回。
//!
//! # shutdown の順序
//! 1. shutdown signal を broadcast（全 worker の待機点が観測する）
//! 2. producer を閉じる（以降の enqueue は `Closed`）
//! 3. 送信中の producer が抜けた時点で channel が閉じる
//! 4. 全 worker の終了を deadline 付きで待つ。間に合わなければログに残して先に進む
//! 5. queue に残った request を取り出し、discarded としてログと統計に残す

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Stand-in deadline when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

use super::status::{WorkerBoard, WorkerState};
use super::worker_loop::{WorkerExit, WorkerLoop};
use crate::domain::TaskId;
use crate::impls::{CompletionProducer, CompletionReceiver, completion_queue};
use crate::observability::{CompletionCounts, CompletionStats};
use crate::ports::TaskStore;

/// Running auto-complete pipeline.
///
/// Dropping it without calling `shutdown` also stops the workers (the
/// shutdown channel closes), but nobody waits for them.
pub struct AutoCompleter {
    producer: CompletionProducer,
    leftovers: CompletionReceiver,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<WorkerExit>>,
    board: Arc<WorkerBoard>,
    stats: Arc<CompletionStats>,
    shutdown_timeout: Duration,
}

impl AutoCompleter {
    /// Spawn `workers` loops on the current Tokio runtime.
    pub(crate) fn start(
        store: Arc<dyn TaskStore>,
        workers: usize,
        queue_capacity: usize,
        delay: Duration,
        enqueue_timeout: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        let stats = Arc::new(CompletionStats::new());
        let board = Arc::new(WorkerBoard::new(workers));
        let (producer, receiver) = completion_queue(queue_capacity, enqueue_timeout, stats.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = (0..workers)
            .map(|worker_id| {
                let worker = WorkerLoop::new(
                    worker_id,
                    receiver.clone(),
                    Arc::clone(&store),
                    delay,
                    shutdown_rx.clone(),
                    Arc::clone(&board),
                    Arc::clone(&stats),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            workers,
            queue_capacity,
            delay_ms = delay.as_millis() as u64,
            enqueue_timeout_ms = enqueue_timeout.as_millis() as u64,
            "auto-completer started"
        );

        Self {
            producer,
            leftovers: receiver,
            shutdown_tx,
            workers: handles,
            board,
            stats,
            shutdown_timeout,
        }
    }

    /// Producer handle for the task creation path.
    pub fn producer(&self) -> CompletionProducer {
        self.producer.clone()
    }

    pub fn counts(&self) -> CompletionCounts {
        self.stats.snapshot()
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.board.snapshot()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Shut down with the configured deadline.
    pub async fn shutdown(self) -> DrainReport {
        let timeout = self.shutdown_timeout;
        self.shutdown_within(timeout).await
    }

    /// Shut down, waiting at most `timeout` for the workers.
    ///
    /// Always returns by the deadline. Workers that have not confirmed exit
    /// by then are listed in [`DrainReport::unconfirmed`] and left to die with
    /// the process.
    pub async fn shutdown_within(self, timeout: Duration) -> DrainReport {
        info!(timeout_ms = timeout.as_millis() as u64, "auto-completer shutting down");
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);

        // send_replace: receivers may already be gone
        self.shutdown_tx.send_replace(true);
        self.producer.close();

        let mut report = DrainReport::default();
        for (worker_id, mut handle) in self.workers.into_iter().enumerate() {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(exit)) => report.stopped.push((worker_id, exit)),
                Ok(Err(e)) => {
                    error!(worker_id, error = %e, "auto-complete worker panicked");
                    report.panicked.push(worker_id);
                }
                Err(_) => {
                    let state = self.board.get(worker_id).unwrap_or(WorkerState::Stopped);
                    warn!(worker_id, state = %state, "auto-complete worker did not stop before the deadline");
                    report.unconfirmed.push((worker_id, state));
                }
            }
        }
        report.discarded = discard_queued(&self.leftovers, &self.stats);
        report.counts = self.stats.snapshot();

        info!(
            stopped = report.stopped.len(),
            discarded = report.discarded.len(),
            unconfirmed = report.unconfirmed.len(),
            panicked = report.panicked.len(),
            abandoned = report.counts.abandoned,
            "auto-completer shut down"
        );
        report
    }
}

/// Empty the queue after the workers are gone. These requests never run.
fn discard_queued(leftovers: &CompletionReceiver, stats: &CompletionStats) -> Vec<TaskId> {
    let mut discarded = Vec::new();
    while let Some(task_id) = leftovers.try_recv() {
        stats.record_discarded();
        info!(task_id = %task_id, "request still queued at shutdown, auto-complete discarded");
        discarded.push(task_id);
    }
    discarded
}

/// What `shutdown` saw. Every worker id appears in exactly one list.
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    pub stopped: Vec<(usize, WorkerExit)>,
    pub panicked: Vec<usize>,
    /// Still running at the deadline, with the state they were last in.
    pub unconfirmed: Vec<(usize, WorkerState)>,
    /// Requests left in the queue, in queue order.
    pub discarded: Vec<TaskId>,
    pub counts: CompletionCounts,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.unconfirmed.is_empty() && self.panicked.is_empty()
    }

    /// Tasks whose auto-complete was dropped by the shutdown.
    pub fn abandoned_tasks(&self) -> Vec<TaskId> {
        self.stopped
            .iter()
            .filter_map(|(_, exit)| match exit {
                WorkerExit::Abandoned(task_id) => Some(*task_id),
                _ => None,
            })
            .collect()
    }

    pub fn accounted_workers(&self) -> usize {
        self.stopped.len() + self.panicked.len() + self.unconfirmed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AutoComplete, NewTask, StoreError, Task, TaskStatus, UserId};
    use crate::impls::InMemoryTaskStore;
    use crate::ports::{Clock, EnqueueOutcome, SystemClock};
    use async_trait::async_trait;
    use ulid::Ulid;

    fn start(store: Arc<dyn TaskStore>, workers: usize, delay: Duration) -> AutoCompleter {
        start_with_capacity(store, workers, 16, delay)
    }

    fn start_with_capacity(
        store: Arc<dyn TaskStore>,
        workers: usize,
        capacity: usize,
        delay: Duration,
    ) -> AutoCompleter {
        AutoCompleter::start(
            store,
            workers,
            capacity,
            delay,
            Duration::from_millis(500),
            Duration::from_secs(10),
        )
    }

    async fn create_task(store: &dyn TaskStore) -> TaskId {
        let task = Task::new(
            TaskId::from_ulid(Ulid::new()),
            NewTask::new("t", ""),
            UserId::from_ulid(Ulid::new()),
            SystemClock.now(),
        );
        store.create(&task).await.unwrap();
        task.id
    }

    /// Store whose auto-complete never returns.
    struct HangingStore(InMemoryTaskStore);

    #[async_trait]
    impl TaskStore for HangingStore {
        async fn create(&self, task: &Task) -> Result<(), StoreError> {
            self.0.create(task).await
        }

        async fn get_by_id(&self, id: TaskId) -> Result<Task, StoreError> {
            self.0.get_by_id(id).await
        }

        async fn list(&self, owner: Option<UserId>) -> Result<Vec<Task>, StoreError> {
            self.0.list(owner).await
        }

        async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
            self.0.delete(id).await
        }

        async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StoreError> {
            self.0.update_status(id, status).await
        }

        async fn conditional_auto_complete(&self, _id: TaskId) -> Result<AutoComplete, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_the_requested_number_of_workers() {
        let completer = start(Arc::new(InMemoryTaskStore::new()), 4, Duration::from_secs(1));
        tokio::task::yield_now().await;

        assert_eq!(completer.worker_count(), 4);
        assert_eq!(completer.worker_states(), vec![WorkerState::Idle; 4]);

        let report = completer.shutdown().await;
        assert!(report.is_clean());
        assert_eq!(report.stopped.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_workers_mid_delay() {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let completer = start(store.clone(), 2, Duration::from_secs(60));
        let a = create_task(store.as_ref()).await;
        let b = create_task(store.as_ref()).await;
        let producer = completer.producer();
        producer.enqueue(a).await;
        producer.enqueue(b).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(completer.worker_states(), vec![WorkerState::Delaying; 2]);

        let started = Instant::now();
        let report = completer.shutdown_within(Duration::from_secs(10)).await;

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(report.is_clean());
        assert_eq!(report.accounted_workers(), 2);
        let mut abandoned = report.abandoned_tasks();
        abandoned.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(abandoned, expected);
        assert_eq!(report.counts.abandoned, 2);
        assert_eq!(store.get_by_id(a).await.unwrap().status, TaskStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_returns_at_the_deadline_with_stuck_workers() {
        let store: Arc<dyn TaskStore> = Arc::new(HangingStore(InMemoryTaskStore::new()));
        let completer = start(store.clone(), 2, Duration::from_millis(10));
        let id = create_task(store.as_ref()).await;
        completer.producer().enqueue(id).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        let report = completer.shutdown_within(Duration::from_secs(2)).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
        assert!(!report.is_clean());
        assert_eq!(report.unconfirmed.len(), 1);
        assert_eq!(report.unconfirmed[0].1, WorkerState::Completing);
        assert_eq!(report.stopped.len(), 1);
        assert_eq!(report.accounted_workers(), 2);
    }

    #[tokio::test]
    async fn producer_is_closed_after_shutdown() {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let completer = start(store.clone(), 1, Duration::from_secs(1));
        let producer = completer.producer();

        let report = completer.shutdown().await;
        let outcome = producer.enqueue(create_task(store.as_ref()).await).await;

        assert!(producer.is_closed());
        assert_eq!(outcome, EnqueueOutcome::Closed);
        assert_eq!(report.counts.rejected, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_requests_are_discarded_and_counted_at_shutdown() {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let completer = start_with_capacity(store.clone(), 1, 4, Duration::from_secs(60));
        let producer = completer.producer();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let id = create_task(store.as_ref()).await;
            assert_eq!(producer.enqueue(id).await, EnqueueOutcome::Enqueued);
            ids.push(id);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(completer.worker_states(), vec![WorkerState::Delaying]);

        let report = completer.shutdown_within(Duration::from_secs(10)).await;

        assert!(report.is_clean());
        assert_eq!(report.abandoned_tasks(), vec![ids[0]]);
        assert_eq!(report.discarded, vec![ids[1], ids[2]]);
        assert_eq!(report.counts.enqueued, 3);
        assert_eq!(report.counts.abandoned, 1);
        assert_eq!(report.counts.discarded, 2);
        assert_eq!(report.counts.settled(), report.counts.enqueued);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_shutdown_timeout_does_not_overflow() {
        let completer = start(Arc::new(InMemoryTaskStore::new()), 1, Duration::from_secs(1));

        let report = completer.shutdown_within(Duration::MAX).await;

        assert!(report.is_clean());
        assert_eq!(report.stopped.len(), 1);
    }
}
