//! CompletionSink port - 作成済みタスクを auto-complete パイプラインへ渡す
//!
//! 流すのは `TaskId` のみ（状態・所有者は完了時に TaskStore から読み直す）。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::TaskId;

/// What happened to one hand-off attempt.
///
/// None of these are errors from the producer's point of view: task creation
/// succeeds regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnqueueOutcome {
    /// Accepted by the queue.
    Enqueued,
    /// Queue stayed full for the whole enqueue timeout.
    Dropped,
    /// Shutdown has started; nothing is accepted any more.
    Closed,
}

impl EnqueueOutcome {
    pub fn is_enqueued(self) -> bool {
        matches!(self, EnqueueOutcome::Enqueued)
    }
}

/// CompletionSink は task_id を受け取る producer 側の口
#[async_trait]
pub trait CompletionSink: Send + Sync {
    /// Must return within the sink's enqueue timeout.
    async fn submit(&self, task_id: TaskId) -> EnqueueOutcome;
}
