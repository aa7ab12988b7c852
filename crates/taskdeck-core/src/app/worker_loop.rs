//! WorkerLoop - auto-complete の実行ループ
//!
//! # フロー
//! 1. CompletionReceiver から task_id を受け取る（shutdown と競合）
//! 2. delay だけ待つ（shutdown と競合。shutdown が先なら request を捨てて終了）
//! 3. TaskStore::conditional_auto_complete() を呼ぶ（ここは shutdown で中断しない）
//! 4. 1 に戻る

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::status::{WorkerBoard, WorkerState};
use crate::domain::{AutoComplete, TaskId};
use crate::impls::CompletionReceiver;
use crate::observability::CompletionStats;
use crate::ports::TaskStore;

/// Why a worker loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Shutdown observed while idle.
    Cancelled,
    /// Queue closed and drained.
    QueueClosed,
    /// Shutdown observed while waiting out the delay for this task.
    Abandoned(TaskId),
}

pub struct WorkerLoop {
    worker_id: usize,
    receiver: CompletionReceiver,
    store: Arc<dyn TaskStore>,
    delay: Duration,
    shutdown_rx: watch::Receiver<bool>,
    board: Arc<WorkerBoard>,
    stats: Arc<CompletionStats>,
}

impl WorkerLoop {
    pub fn new(
        worker_id: usize,
        receiver: CompletionReceiver,
        store: Arc<dyn TaskStore>,
        delay: Duration,
        shutdown_rx: watch::Receiver<bool>,
        board: Arc<WorkerBoard>,
        stats: Arc<CompletionStats>,
    ) -> Self {
        Self {
            worker_id,
            receiver,
            store,
            delay,
            shutdown_rx,
            board,
            stats,
        }
    }

    pub async fn run(mut self) -> WorkerExit {
        let worker_id = self.worker_id;
        info!(worker_id, "auto-complete worker started");

        let exit = loop {
            self.board.set(worker_id, WorkerState::Idle);

            // biased: shutdown が既に来ていれば queue に残っていても取らない
            let task_id = tokio::select! {
                biased;
                _ = shutdown_requested(&mut self.shutdown_rx) => break WorkerExit::Cancelled,
                next = self.receiver.recv() => match next {
                    Some(task_id) => task_id,
                    None => break WorkerExit::QueueClosed,
                },
            };

            self.board.set(worker_id, WorkerState::Delaying);
            debug!(worker_id, task_id = %task_id, delay_ms = self.delay.as_millis() as u64, "received task");

            let delay_elapsed = tokio::select! {
                biased;
                _ = shutdown_requested(&mut self.shutdown_rx) => false,
                _ = tokio::time::sleep(self.delay) => true,
            };

            if !delay_elapsed {
                self.board.set(worker_id, WorkerState::Abandoned);
                self.stats.record_abandoned();
                info!(worker_id, task_id = %task_id, "shutdown while waiting, auto-complete abandoned");
                break WorkerExit::Abandoned(task_id);
            }

            self.board.set(worker_id, WorkerState::Completing);
            self.complete(task_id).await;
        };

        self.board.set(worker_id, WorkerState::Stopped);
        info!(worker_id, exit = ?exit, "auto-complete worker stopped");
        exit
    }

    async fn complete(&self, task_id: TaskId) {
        let worker_id = self.worker_id;
        match self.store.conditional_auto_complete(task_id).await {
            Ok(AutoComplete::Completed) => {
                self.stats.record_completed();
                info!(worker_id, task_id = %task_id, "task auto-completed");
            }
            Ok(AutoComplete::NotApplicable) => {
                self.stats.record_not_applicable();
                debug!(worker_id, task_id = %task_id, "auto-complete not applicable (completed or deleted)");
            }
            Err(e) => {
                // no retry: the task just stays in its current status
                self.stats.record_failed();
                error!(worker_id, task_id = %task_id, error = %e, "auto-complete failed");
            }
        }
    }
}

/// Resolves once shutdown is requested or the coordinator is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
