//! Application façade over task operations and notification dispatch.
//!
//! Every public operation is a business transaction: validate, mutate,
//! commit the mutation with its audit entry, then dispatch notifications
//! best-effort. A dispatch failure after a successful commit is logged and
//! recorded; it never fails the operation.

use crate::notify::{
    domain::{ACKNOWLEDGE_NOTE, COMMENT_EVENT, REFRESH_EVENT, date_event, status_event},
    ports::{Messenger, NotificationRepository},
    services::{DispatchError, Dispatcher},
};
use crate::task::{
    domain::{AssignedSlot, NewTaskData, Status, Task, TaskId, User},
    ports::{TaskRepository, TaskRepositoryError},
    services::{TaskOperationError, TaskOperations},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors returned by the work-order façade.
#[derive(Debug, Error)]
pub enum WorkOrderError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The underlying operation failed.
    #[error(transparent)]
    Operation(#[from] TaskOperationError),
}

impl WorkOrderError {
    /// Whether the caller should re-fetch and retry.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Operation(err) if err.is_conflict())
    }
}

impl From<TaskRepositoryError> for WorkOrderError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::Operation(err.into())
    }
}

/// Result type for façade operations.
pub type WorkOrderResult<T> = Result<T, WorkOrderError>;

/// The application service tying the task workflow to notifications.
pub struct WorkOrderService<R, N, M, C>
where
    R: TaskRepository,
    N: NotificationRepository,
    M: Messenger,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    operations: TaskOperations<R, C>,
    dispatcher: Dispatcher<N, M, R, C>,
}

impl<R, N, M, C> WorkOrderService<R, N, M, C>
where
    R: TaskRepository,
    N: NotificationRepository,
    M: Messenger,
    C: Clock + Send + Sync,
{
    /// Creates the façade from its collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<N>,
        messenger: Arc<M>,
        clock: Arc<C>,
    ) -> Self {
        let operations = TaskOperations::new(Arc::clone(&repository), Arc::clone(&clock));
        let dispatcher = Dispatcher::new(
            notifications,
            messenger,
            Arc::clone(&repository),
            clock,
        );
        Self {
            repository,
            operations,
            dispatcher,
        }
    }

    /// Loads a task or fails with [`WorkOrderError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`] or a repository error.
    pub async fn fetch(&self, task_id: TaskId) -> WorkOrderResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await
            .map_err(WorkOrderError::from)?
            .ok_or(WorkOrderError::NotFound(task_id))
    }

    /// Creates a task and notifies whoever must act first.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an invalid initial status, or a
    /// repository error.
    pub async fn create_task(&self, data: NewTaskData) -> WorkOrderResult<Task> {
        let task = self.operations.create(data).await?;
        info!(task_id = %task.id(), status = task.status().as_str(), "task created");
        let event = status_event(&task, task.status());
        Self::dispatch(self.dispatcher.notify_responsible(&task, &event, false).await);
        Ok(task)
    }

    /// Applies a status change on behalf of `actor`.
    ///
    /// Requesting the current status is a refresh, not a transition: the
    /// live card is re-rendered in place and no audit entry is written.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`], a domain validation error, or
    /// a retryable conflict.
    pub async fn change_status(
        &self,
        actor: &User,
        task_id: TaskId,
        new_status: Status,
        comment: Option<String>,
    ) -> WorkOrderResult<Task> {
        let mut task = self.fetch(task_id).await?;

        if new_status == task.status() {
            Self::dispatch(
                self.dispatcher
                    .notify_responsible(&task, REFRESH_EVENT, true)
                    .await,
            );
            return Ok(task);
        }

        self.operations
            .status_change(&mut task, actor, new_status, comment)
            .await?;
        info!(
            task_id = %task.id(),
            status = new_status.as_str(),
            actor = %actor.id(),
            "status changed"
        );
        // Responsibility moved on, so the actor's stale card retires.
        if task.whom_notify().is_none_or(|next| next.id() != actor.id()) {
            Self::dispatch(self.dispatcher.retire_for(task_id, actor.id()).await);
        }
        let event = status_event(&task, new_status);
        Self::dispatch(self.dispatcher.notify_responsible(&task, &event, true).await);
        Ok(task)
    }

    /// Moves the planned date on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`], a domain validation error, or
    /// a retryable conflict.
    pub async fn change_plan_date(
        &self,
        actor: &User,
        task_id: TaskId,
        new_date: NaiveDate,
        comment: Option<String>,
    ) -> WorkOrderResult<Task> {
        let mut task = self.fetch(task_id).await?;
        self.operations
            .date_change(&mut task, actor, new_date, comment)
            .await?;
        info!(task_id = %task.id(), %new_date, actor = %actor.id(), "plan date changed");
        let event = date_event(&task);
        Self::dispatch(self.dispatcher.notify_responsible(&task, &event, true).await);
        Ok(task)
    }

    /// Appends a free-text comment and broadcasts it to everyone involved
    /// except the author.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`] or a repository error.
    pub async fn add_comment(
        &self,
        actor: &User,
        task_id: TaskId,
        text: impl Into<String> + Send,
    ) -> WorkOrderResult<Task> {
        let mut task = self.fetch(task_id).await?;
        self.operations.add_note(&mut task, actor, text).await?;
        Self::dispatch(
            self.dispatcher
                .broadcast(&task, COMMENT_EVENT, actor.id())
                .await,
        );
        Ok(task)
    }

    /// Records that `actor` has read the card and hides their live copy.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`] or a repository error.
    pub async fn acknowledge(&self, actor: &User, task_id: TaskId) -> WorkOrderResult<Task> {
        let mut task = self.fetch(task_id).await?;
        self.operations
            .add_note(&mut task, actor, ACKNOWLEDGE_NOTE)
            .await?;
        Self::dispatch(self.dispatcher.retire_for(task_id, actor.id()).await);
        Ok(task)
    }

    /// Hands an assignment slot to another user on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkOrderError::NotFound`], a domain validation error, or
    /// a retryable conflict.
    pub async fn reassign(
        &self,
        actor: &User,
        task_id: TaskId,
        slot: AssignedSlot,
        new_user: User,
    ) -> WorkOrderResult<Task> {
        let mut task = self.fetch(task_id).await?;
        self.operations
            .reassign(&mut task, actor, slot, new_user)
            .await?;
        info!(task_id = %task.id(), actor = %actor.id(), "assignment changed");
        Self::dispatch(
            self.dispatcher
                .notify_responsible(&task, REFRESH_EVENT, true)
                .await,
        );
        Ok(task)
    }

    /// Absorbs a post-commit dispatch failure into the log.
    fn dispatch<T>(outcome: Result<T, DispatchError>) {
        if let Err(err) = outcome {
            error!(%err, "notification dispatch failed after commit");
        }
    }
}
