//! TaskService - ユーザー向けのタスク操作
//!
//! task 作成は「永続化 → auto-complete の予約」の順。予約が queue の混雑で
//! 落ちても作成自体は成功として返す。

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Actor, InvalidStatus, NewTask, StoreError, Task, TaskId, TaskStatus};
use crate::ports::{Clock, CompletionSink, IdGenerator, SystemClock, TaskStore, UlidGenerator};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("forbidden: {0} belongs to another user")]
    Forbidden(TaskId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    completions: Arc<dyn CompletionSink>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, completions: Arc<dyn CompletionSink>) -> Self {
        Self::with_clock(store, completions, Arc::new(SystemClock))
    }

    /// Timestamps and id prefixes come from `clock`.
    pub fn with_clock(
        store: Arc<dyn TaskStore>,
        completions: Arc<dyn CompletionSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            completions,
            ids: Arc::new(UlidGenerator::new(Arc::clone(&clock))),
            clock,
        }
    }

    /// Persist a new `pending` task owned by `actor`, then schedule its auto-complete.
    pub async fn create(&self, actor: &Actor, draft: NewTask) -> Result<Task, ServiceError> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("title must not be empty".to_string()));
        }

        let task = Task::new(
            self.ids.generate_task_id(),
            draft,
            actor.user_id,
            self.clock.now(),
        );
        self.store.create(&task).await?;
        info!(task_id = %task.id, owner = %task.owner_id, "task created");

        // 予約の成否は create の結果に影響しない（ログと統計は queue 側）
        let outcome = self.completions.submit(task.id).await;
        if !outcome.is_enqueued() {
            debug!(task_id = %task.id, outcome = ?outcome, "task will not be auto-completed");
        }

        Ok(task)
    }

    /// Admins see every task, users only their own.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Task>, ServiceError> {
        let owner = (!actor.is_admin()).then_some(actor.user_id);
        Ok(self.store.list(owner).await?)
    }

    pub async fn get(&self, actor: &Actor, id: TaskId) -> Result<Task, ServiceError> {
        let task = self.store.get_by_id(id).await?;
        if !actor.can_access(task.owner_id) {
            return Err(ServiceError::Forbidden(id));
        }
        Ok(task)
    }

    /// Manual status change. Any status may be set, including back to `pending`.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, ServiceError> {
        self.get(actor, id).await?;
        self.store.update_status(id, status).await?;
        info!(task_id = %id, status = %status, "task status updated");
        self.get(actor, id).await
    }

    pub async fn delete(&self, actor: &Actor, id: TaskId) -> Result<(), ServiceError> {
        self.get(actor, id).await?;
        self.store.delete(id).await?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }
}
