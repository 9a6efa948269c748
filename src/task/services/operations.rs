//! Transactional work-order operations.
//!
//! Each operation validates against the domain, mutates the aggregate, and
//! commits the mutation together with exactly one audit entry. Notification
//! dispatch is deliberately not here: it runs after the commit, driven by
//! the application layer.

use crate::task::{
    domain::{
        AssignedSlot, Comment, CommentKind, NewTaskData, Status, Task, TaskDomainError, User,
        UserRef,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for work-order operations.
#[derive(Debug, Error)]
pub enum TaskOperationError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskOperationError {
    /// Whether the caller should re-fetch and re-validate before retrying.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_conflict())
    }
}

/// Result type for work-order operations.
pub type TaskOperationResult<T> = Result<T, TaskOperationError>;

/// Transactional mutation service over the task aggregate.
#[derive(Clone)]
pub struct TaskOperations<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskOperations<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new operations service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates and stores a new task.
    ///
    /// # Errors
    ///
    /// Returns a domain error for an invalid initial status, or a
    /// repository error when persistence fails.
    pub async fn create(&self, data: NewTaskData) -> TaskOperationResult<Task> {
        let task = Task::new(data, &*self.clock)?;
        self.repository.store(&task).await?;
        Ok(task)
    }

    /// Applies a status transition on behalf of `actor`.
    ///
    /// Statuses in the justification set require a non-empty `reason`. The
    /// aggregate mutation and its audit entry commit atomically against the
    /// version the task was fetched at; on a conflict the caller must
    /// discard the aggregate, re-fetch, and re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`],
    /// [`TaskDomainError::StatusCommentRequired`], or a repository error.
    pub async fn status_change(
        &self,
        task: &mut Task,
        actor: &User,
        new_status: Status,
        reason: Option<String>,
    ) -> TaskOperationResult<Comment> {
        if new_status.requires_comment() && !has_text(reason.as_deref()) {
            return Err(TaskDomainError::StatusCommentRequired(new_status).into());
        }

        let roles = task.roles_of(actor.id());
        let previous = task.status();
        let expected = task.version();
        task.update_status(new_status, roles, &*self.clock)?;

        let comment = Comment::new(
            task.id(),
            Some(actor),
            roles,
            CommentKind::StatusChange {
                from: previous,
                to: new_status,
                reason,
            },
            &*self.clock,
        );
        self.commit(task, expected, comment).await
    }

    /// Moves the planned date on behalf of `actor`.
    ///
    /// Suppliers may silently reschedule; every other permitted role must
    /// justify the move. Dates in the past and no-op changes are rejected.
    ///
    /// # Errors
    ///
    /// Returns the corresponding [`TaskDomainError`] variant, or a
    /// repository error.
    pub async fn date_change(
        &self,
        task: &mut Task,
        actor: &User,
        new_date: NaiveDate,
        reason: Option<String>,
    ) -> TaskOperationResult<Comment> {
        let permission = task.permission_for(actor.id());
        if !permission.can_change_date {
            return Err(TaskDomainError::DateChangeForbidden.into());
        }
        if new_date < self.clock.utc().date_naive() {
            return Err(TaskDomainError::DateInPast(new_date).into());
        }
        if new_date == task.actual_plan_date() {
            return Err(TaskDomainError::SamePlanDate(new_date).into());
        }
        if permission.must_comment_date && !has_text(reason.as_deref()) {
            return Err(TaskDomainError::DateCommentRequired.into());
        }

        let previous = task.actual_plan_date();
        let expected = task.version();
        task.change_plan_date(new_date, &*self.clock);

        let comment = Comment::new(
            task.id(),
            Some(actor),
            permission.roles,
            CommentKind::DateChange {
                from: previous,
                to: new_date,
                reason,
            },
            &*self.clock,
        );
        self.commit(task, expected, comment).await
    }

    /// Hands an assignment slot to `new_user` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the commit fails.
    pub async fn reassign(
        &self,
        task: &mut Task,
        actor: &User,
        slot: AssignedSlot,
        new_user: User,
    ) -> TaskOperationResult<Comment> {
        let roles = task.roles_of(actor.id());
        let expected = task.version();
        let new_ref = UserRef::of(&new_user);
        let previous = task.reassign(slot, new_user, &*self.clock);

        let comment = Comment::new(
            task.id(),
            Some(actor),
            roles,
            CommentKind::Reassignment {
                slot,
                old_user: UserRef::of(&previous),
                new_user: new_ref,
            },
            &*self.clock,
        );
        self.commit(task, expected, comment).await
    }

    /// Appends a free-text remark without touching the task row.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the append fails.
    pub async fn add_note(
        &self,
        task: &mut Task,
        actor: &User,
        text: impl Into<String>,
    ) -> TaskOperationResult<Comment> {
        let roles = task.roles_of(actor.id());
        let comment = Comment::new(
            task.id(),
            Some(actor),
            roles,
            CommentKind::Note { text: text.into() },
            &*self.clock,
        );
        self.repository.append_comment(task.id(), &comment).await?;
        task.push_comment(comment.clone());
        Ok(comment)
    }

    async fn commit(
        &self,
        task: &mut Task,
        expected: u64,
        comment: Comment,
    ) -> TaskOperationResult<Comment> {
        self.repository
            .update_with_comment(task, expected, &comment)
            .await?;
        task.set_version(expected + 1);
        task.push_comment(comment.clone());
        Ok(comment)
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}
