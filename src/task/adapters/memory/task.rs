//! In-memory task repository for service tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Comment, PersistedTaskData, Status, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, PersistedTaskData>,
    comments: HashMap<TaskId, Vec<Comment>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn assemble(data: &PersistedTaskData, comments: &HashMap<TaskId, Vec<Comment>>) -> Task {
    let history = comments.get(&data.id).cloned().unwrap_or_default();
    Task::from_persisted(data.clone(), history)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.comments.insert(task.id(), task.comments().to_vec());
        state.tasks.insert(task.id(), task.to_persisted());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .get(&id)
            .map(|data| assemble(data, &state.comments)))
    }

    async fn update_with_comment(
        &self,
        task: &Task,
        expected_version: u64,
        comment: &Comment,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if stored.version != expected_version {
            return Err(TaskRepositoryError::Conflict {
                task_id: task.id(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        let mut data = task.to_persisted();
        data.version = expected_version + 1;
        *stored = data;
        state
            .comments
            .entry(task.id())
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn append_comment(
        &self,
        task_id: TaskId,
        comment: &Comment,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.tasks.contains_key(&task_id) {
            return Err(TaskRepositoryError::NotFound(task_id));
        }
        state
            .comments
            .entry(task_id)
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn record_notification_sent(
        &self,
        task_id: TaskId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task_id)
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
        stored.notification_count += 1;
        stored.last_notification_at = Some(at);
        Ok(())
    }

    async fn find_due(
        &self,
        dates: &[NaiveDate],
        statuses: &[Status],
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut due: Vec<Task> = state
            .tasks
            .values()
            .filter(|data| {
                dates.contains(&data.actual_plan_date) && statuses.contains(&data.status)
            })
            .map(|data| assemble(data, &state.comments))
            .collect();
        due.sort_by_key(|task| (task.actual_plan_date(), task.id()));
        Ok(due)
    }
}
