//! InMemoryTaskStore - 開発・テスト用の TaskStore
//!
//! # 実装詳細
//! - `RwLock<HashMap<TaskId, Task>>` で排他制御
//! - conditional auto-complete は write lock 1 回の中で check + write
//!   （SQL の `UPDATE ... WHERE status IN (...)` と同じ原子性）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AutoComplete, StoreError, Task, TaskId, TaskStatus, UserId};
use crate::ports::{Clock, SystemClock, TaskStore};

pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(StoreError::AlreadyExists(task.id));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task, StoreError> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut listed: Vec<Task> = tasks
            .values()
            .filter(|task| owner.is_none_or(|owner| task.is_owned_by(owner)))
            .cloned()
            .collect();
        // newest first; ULID breaks ties between tasks created in the same instant
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        task.status = status;
        task.updated_at = self.clock.now();
        Ok(())
    }

    async fn conditional_auto_complete(&self, id: TaskId) -> Result<AutoComplete, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(task) if task.status.is_auto_completable() => {
                task.status = TaskStatus::Completed;
                task.updated_at = self.clock.now();
                Ok(AutoComplete::Completed)
            }
            _ => Ok(AutoComplete::NotApplicable),
        }
    }
}
