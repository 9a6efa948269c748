//! Repository port for notification delivery records.

use crate::notify::domain::{NotificationId, NotificationRecord};
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Persistence contract for delivery records.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores a new delivery record.
    async fn add(&self, record: &NotificationRecord) -> NotificationRepositoryResult<()>;

    /// Active records for a task, newest first.
    async fn active_for_task(
        &self,
        task_id: TaskId,
    ) -> NotificationRepositoryResult<Vec<NotificationRecord>>;

    /// Active records for one recipient of a task, newest first.
    async fn active_for_recipient(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> NotificationRepositoryResult<Vec<NotificationRecord>>;

    /// Marks a record inactive.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when no such
    /// record exists.
    async fn deactivate(&self, id: NotificationId) -> NotificationRepositoryResult<()>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// The record was not found.
    #[error("notification record not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
