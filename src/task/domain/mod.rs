//! Domain model for work-order tracking.
//!
//! Pure types and functions: the status/role transition table, the task
//! aggregate with its derived permission and notification queries, and the
//! append-only audit log. Infrastructure stays behind the ports.

mod comment;
mod error;
mod ids;
mod permission;
mod role;
mod status;
mod task;
mod user;

pub use comment::{AssignedSlot, Comment, CommentAuthor, CommentKind, PersistedCommentData};
pub use error::{ParseStatusError, TaskDomainError};
pub use ids::{ChatId, CommentId, TaskId, UserId};
pub use permission::PermissionSnapshot;
pub use role::{Role, RoleSet};
pub use status::{
    ALL_STATUSES, EXECUTOR_STATUSES, NOTIFICATION_STATUSES, SHOULD_BE_COMMENTED,
    SUPERVISOR_STATUSES, SUPPLIER_STATUSES, Status, available_statuses, is_valid_transition,
};
pub use task::{NewTaskData, PersistedTaskData, Task};
pub use user::{User, UserRef};
