//! Errors - エラー型と分類

use thiserror::Error;

use super::ids::TaskId;

/// Errors returned by a [`TaskStore`](crate::ports::TaskStore).
///
/// `NotFound` is a normal answer for user-facing operations.
/// `Unavailable` is the infrastructure class (connection lost, pool exhausted, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),

    #[error("task store unavailable: {0}")]
    Unavailable(String),
}

/// A status string that is not one of `pending`, `in_progress`, `completed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task status: {0:?}")]
pub struct InvalidStatus(pub String);
