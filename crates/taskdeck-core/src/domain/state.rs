//! State - タスクの状態
//!
//! # 状態遷移
//! - pending → in_progress → completed（ユーザー操作）
//! - pending / in_progress → completed（auto-complete、条件付き）
//!
//! `completed` からの auto-complete は no-op です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::InvalidStatus;

/// TaskStatus はタスクの状態を表現
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, nobody has started it.
    #[default]
    Pending,
    /// Someone is working on it.
    InProgress,
    /// Done, either manually or by the auto-completer.
    Completed,
}

impl TaskStatus {
    /// Statuses the conditional auto-complete is allowed to move to `Completed`.
    pub const AUTO_COMPLETABLE: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];

    pub fn is_auto_completable(self) -> bool {
        Self::AUTO_COMPLETABLE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}
