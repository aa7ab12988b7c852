//! Domain model (IDs, task record, status, outcomes, errors).

pub mod actor;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod task;

pub use actor::{Actor, Role};
pub use errors::{InvalidStatus, StoreError};
pub use ids::{Id, IdMarker, ParseIdError, TaskId, UserId};
pub use outcome::AutoComplete;
pub use state::TaskStatus;
pub use task::{NewTask, Task};
