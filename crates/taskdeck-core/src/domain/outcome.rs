//! Outcome model for the conditional auto-complete.

use serde::{Deserialize, Serialize};

/// Result of `TaskStore::conditional_auto_complete`.
///
/// Both variants are successes. Infrastructure failures travel as
/// `Err(StoreError)` instead, so "nothing to do" is never confused with
/// "could not ask".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoComplete {
    /// The task was `pending` or `in_progress` and is now `completed`.
    Completed,

    /// Already completed, deleted, or never existed. No row was touched.
    NotApplicable,
}
