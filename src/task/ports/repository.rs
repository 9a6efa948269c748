//! Repository port for task persistence and the audit log.

use crate::task::domain::{Comment, Status, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations must keep a task's comments observable in creation
/// order and must make [`TaskRepository::update_with_comment`] atomic: the
/// scalar mutation and its audit entry commit together or not at all.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Loads a task with its full comment history eagerly attached.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Persists a mutated task together with exactly one audit entry.
    ///
    /// The write only applies when the stored version still equals
    /// `expected_version`; the committed row carries `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Conflict`] when another writer got
    /// there first, or [`TaskRepositoryError::NotFound`] when the task is
    /// gone.
    async fn update_with_comment(
        &self,
        task: &Task,
        expected_version: u64,
        comment: &Comment,
    ) -> TaskRepositoryResult<()>;

    /// Appends an audit entry without touching the task row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task is gone.
    async fn append_comment(&self, task_id: TaskId, comment: &Comment)
    -> TaskRepositoryResult<()>;

    /// Counts a delivered notification on the task row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task is gone.
    async fn record_notification_sent(
        &self,
        task_id: TaskId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()>;

    /// Tasks whose actual plan date falls on one of `dates` and whose
    /// status is in `statuses`, ordered by plan date. Used by the reminder
    /// sweep.
    async fn find_due(
        &self,
        dates: &[NaiveDate],
        statuses: &[Status],
    ) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer committed between read and write.
    #[error("stale task {task_id}: expected version {expected}, found {actual}")]
    Conflict {
        /// Task contended over.
        task_id: TaskId,
        /// Version the caller read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Whether the caller should re-fetch and re-validate before retrying.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
