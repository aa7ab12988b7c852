use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TaskId, TaskStatus, UserId};

/// A tracked task.
///
/// The task store owns these records. The auto-completer never holds one:
/// it only carries the `TaskId` and re-reads state at completion time.
///
/// Output only. Input goes through [`NewTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing)]
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh `pending` task.
    pub fn new(id: TaskId, draft: NewTask, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::Pending,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// User input for task creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn new_task_starts_pending() {
        let now = Utc::now();
        let owner = UserId::from_ulid(Ulid::new());
        let task = Task::new(
            TaskId::from_ulid(Ulid::new()),
            NewTask::new("write report", ""),
            owner,
            now,
        );

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.is_owned_by(owner));
    }

    #[test]
    fn owner_is_not_serialized() {
        let task = Task::new(
            TaskId::from_ulid(Ulid::new()),
            NewTask::new("t", "d"),
            UserId::from_ulid(Ulid::new()),
            Utc::now(),
        );

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn new_task_reads_request_body_without_description() {
        let draft: NewTask = serde_json::from_str(r#"{"title":"write report"}"#).unwrap();

        assert_eq!(draft, NewTask::new("write report", ""));
    }
}
