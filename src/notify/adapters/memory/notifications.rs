//! In-memory notification repository for service tests.

use crate::notify::{
    domain::{NotificationId, NotificationRecord},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory notification repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    records: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> NotificationRepositoryError {
    NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn newest_first(mut records: Vec<NotificationRecord>) -> Vec<NotificationRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn add(&self, record: &NotificationRecord) -> NotificationRepositoryResult<()> {
        let mut records = self.records.write().map_err(lock_error)?;
        records.push(record.clone());
        Ok(())
    }

    async fn active_for_task(
        &self,
        task_id: TaskId,
    ) -> NotificationRepositoryResult<Vec<NotificationRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(newest_first(
            records
                .iter()
                .filter(|record| record.task_id == task_id && record.active)
                .cloned()
                .collect(),
        ))
    }

    async fn active_for_recipient(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> NotificationRepositoryResult<Vec<NotificationRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(newest_first(
            records
                .iter()
                .filter(|record| {
                    record.task_id == task_id && record.user_id == user_id && record.active
                })
                .cloned()
                .collect(),
        ))
    }

    async fn deactivate(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let mut records = self.records.write().map_err(lock_error)?;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;
        record.active = false;
        Ok(())
    }
}
