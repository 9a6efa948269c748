//! Error types for task domain validation and parsing.

use super::{Status, TaskId};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by task aggregate mutations and validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status transition is not permitted for the caller's
    /// roles.
    #[error("invalid status transition {from} -> {to} on task {task_id}")]
    InvalidTransition {
        /// Task being mutated.
        task_id: TaskId,
        /// Status at the time of the request.
        from: Status,
        /// Requested target status.
        to: Status,
    },

    /// A task may only be created in `Draft` or `Planning`.
    #[error("a task cannot be created in status '{0}'")]
    InvalidInitialStatus(Status),

    /// The target status requires a justification comment.
    #[error("a comment is required when entering status '{0}'")]
    StatusCommentRequired(Status),

    /// Non-supplier roles must justify a plan-date change.
    #[error("a comment is required when rescheduling the task")]
    DateCommentRequired,

    /// The caller may not change the plan date at all.
    #[error("the caller is not allowed to change the plan date")]
    DateChangeForbidden,

    /// The new plan date lies in the past.
    #[error("plan date {0} is in the past")]
    DateInPast(NaiveDate),

    /// The new plan date equals the current one.
    #[error("plan date {0} is already set")]
    SamePlanDate(NaiveDate),
}

/// Error returned while parsing statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseStatusError(pub String);
