//! TaskStore port - タスクの正本（source of truth）
//!
//! 本番では関係 DB が実装します。開発・テスト用には
//! [`InMemoryTaskStore`](crate::impls::InMemoryTaskStore) があります。

use async_trait::async_trait;

use crate::domain::{AutoComplete, StoreError, Task, TaskId, TaskStatus, UserId};

/// TaskStore は durable な task record を管理
///
/// # 設計原則
/// - `conditional_auto_complete` は単一行の条件付き UPDATE
///   （`WHERE id = ? AND status IN ('pending', 'in_progress')`）として実装すること。
///   read-check-write を呼び出し側に持たせない。
/// - 行が見つからない／対象外は `Ok(AutoComplete::NotApplicable)`。
///   `Err` はインフラ障害のみ。
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task. `AlreadyExists` if the id is taken.
    async fn create(&self, task: &Task) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: TaskId) -> Result<Task, StoreError>;

    /// Tasks of one owner, or every task when `owner` is `None`. Newest first.
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Task>, StoreError>;

    async fn delete(&self, id: TaskId) -> Result<(), StoreError>;

    /// Unconditional status write; bumps `updated_at`.
    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StoreError>;

    /// `pending | in_progress → completed`, otherwise a no-op.
    async fn conditional_auto_complete(&self, id: TaskId) -> Result<AutoComplete, StoreError>;
}
