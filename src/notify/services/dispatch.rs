//! Notification dispatch engine.
//!
//! Owns the lifecycle of live task cards: edit in place when the event
//! allows it, otherwise retire every stale message and deliver a fresh one.
//! Transport failures are recorded as audit entries and never bubble into
//! the business transaction that triggered the dispatch.

use crate::notify::{
    domain::{
        DeliveryPlan, DeliveryState, MessageId, NotificationRecord, no_responsible_text,
        retire_failure_text, send_failure_text, task_card,
    },
    ports::{
        Messenger, NotificationRepository, NotificationRepositoryError, TransportError,
    },
};
use crate::task::{
    domain::{Comment, CommentKind, Task, TaskId, User, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by the dispatch engine.
///
/// Only storage failures surface here; transport failures are absorbed
/// into audit entries.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Delivery-record storage failed.
    #[error(transparent)]
    Records(#[from] NotificationRepositoryError),
    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Delivers task cards and keeps at most one live message per recipient.
pub struct Dispatcher<N, M, R, C>
where
    N: NotificationRepository,
    M: Messenger,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    notifications: Arc<N>,
    messenger: Arc<M>,
    tasks: Arc<R>,
    clock: Arc<C>,
}

impl<N, M, R, C> Clone for Dispatcher<N, M, R, C>
where
    N: NotificationRepository,
    M: Messenger,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            notifications: Arc::clone(&self.notifications),
            messenger: Arc::clone(&self.messenger),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<N, M, R, C> Dispatcher<N, M, R, C>
where
    N: NotificationRepository,
    M: Messenger,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new(
        notifications: Arc<N>,
        messenger: Arc<M>,
        tasks: Arc<R>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            notifications,
            messenger,
            tasks,
            clock,
        }
    }

    /// Notifies whoever is responsible for the task's current status.
    ///
    /// Terminal statuses retire every live message and deliver nothing.
    /// When no bucket claims the status the live messages retire, an error
    /// entry is recorded, and `None` is returned. `None` always means "no
    /// live message was delivered", never a crash.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when record or task storage fails.
    pub async fn notify_responsible(
        &self,
        task: &Task,
        event: &str,
        may_edit: bool,
    ) -> DispatchResult<Option<MessageId>> {
        if task.status().is_completed() {
            self.retire_all(task).await?;
            return Ok(None);
        }
        let Some(recipient) = task.whom_notify().cloned() else {
            warn!(
                task_id = %task.id(),
                status = task.status().as_str(),
                "no responsible party to notify"
            );
            self.retire_all(task).await?;
            self.record_error(task.id(), no_responsible_text(task.status()))
                .await?;
            return Ok(None);
        };
        let text = task_card(task, event);
        self.deliver_to(task, &recipient, &text, may_edit).await
    }

    /// Delivers the card to everyone on the task except the acting user.
    ///
    /// Recipients are deduplicated; a person filling two slots gets one
    /// message. Per-recipient transport failures are recorded and do not
    /// stop the remaining deliveries.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when record or task storage fails.
    pub async fn broadcast(
        &self,
        task: &Task,
        event: &str,
        actor: UserId,
    ) -> DispatchResult<()> {
        let text = task_card(task, event);
        let mut seen: Vec<UserId> = Vec::new();
        for recipient in [task.supplier(), task.supervisor(), task.executor()] {
            if recipient.id() == actor || seen.contains(&recipient.id()) {
                continue;
            }
            seen.push(recipient.id());
            self.deliver_to(task, recipient, &text, true).await?;
        }
        Ok(())
    }

    /// Retires every live message for the task.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when record or task storage fails.
    pub async fn retire_all(&self, task: &Task) -> DispatchResult<()> {
        let records = self.notifications.active_for_task(task.id()).await?;
        self.retire_records(task.id(), &records).await
    }

    /// Retires the live messages one recipient holds for the task.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when record or task storage fails.
    pub async fn retire_for(&self, task_id: TaskId, user_id: UserId) -> DispatchResult<()> {
        let records = self
            .notifications
            .active_for_recipient(task_id, user_id)
            .await?;
        self.retire_records(task_id, &records).await
    }

    async fn deliver_to(
        &self,
        task: &Task,
        recipient: &User,
        text: &str,
        may_edit: bool,
    ) -> DispatchResult<Option<MessageId>> {
        let active = self
            .notifications
            .active_for_recipient(task.id(), recipient.id())
            .await?;

        if let DeliveryPlan::EditInPlace(message) = DeliveryState::of(active.first()).plan(may_edit)
        {
            match self.messenger.edit(recipient.chat(), message, text).await {
                Ok(()) | Err(TransportError::NotModified) => {
                    let stragglers = active.get(1..).unwrap_or_default();
                    self.retire_records(task.id(), stragglers).await?;
                    return Ok(Some(message));
                }
                Err(TransportError::Gone) => {
                    if let Some(record) = active.first() {
                        self.notifications.deactivate(record.id).await?;
                    }
                }
                Err(err) => {
                    warn!(
                        task_id = %task.id(),
                        chat = %recipient.chat(),
                        %err,
                        "failed to edit live notification, resending"
                    );
                }
            }
        }

        let remaining = self
            .notifications
            .active_for_recipient(task.id(), recipient.id())
            .await?;
        self.retire_records(task.id(), &remaining).await?;
        self.send_fresh(task, recipient, text).await
    }

    async fn send_fresh(
        &self,
        task: &Task,
        recipient: &User,
        text: &str,
    ) -> DispatchResult<Option<MessageId>> {
        match self.messenger.send(recipient.chat(), text).await {
            Ok(message_id) => {
                let record = NotificationRecord::new(
                    task.id(),
                    recipient.id(),
                    recipient.chat(),
                    message_id,
                    &*self.clock,
                );
                self.notifications.add(&record).await?;
                self.tasks
                    .record_notification_sent(task.id(), self.clock.utc())
                    .await?;
                let marker = Comment::new(
                    task.id(),
                    Some(recipient),
                    task.roles_of(recipient.id()),
                    CommentKind::Notified,
                    &*self.clock,
                );
                self.tasks.append_comment(task.id(), &marker).await?;
                info!(
                    task_id = %task.id(),
                    chat = %recipient.chat(),
                    message_id = %message_id,
                    "notification delivered"
                );
                Ok(Some(message_id))
            }
            Err(err) => {
                warn!(
                    task_id = %task.id(),
                    chat = %recipient.chat(),
                    %err,
                    "failed to send notification"
                );
                self.record_error(task.id(), send_failure_text(&err)).await?;
                Ok(None)
            }
        }
    }

    async fn retire_records(
        &self,
        task_id: TaskId,
        records: &[NotificationRecord],
    ) -> DispatchResult<()> {
        for record in records {
            match self.messenger.delete(record.chat, record.message_id).await {
                // A message already gone at the transport is retired all the same.
                Ok(()) | Err(TransportError::Gone) => {
                    self.notifications.deactivate(record.id).await?;
                }
                Err(err) => {
                    warn!(
                        task_id = %task_id,
                        chat = %record.chat,
                        message_id = %record.message_id,
                        %err,
                        "failed to retire stale notification"
                    );
                    self.record_error(task_id, retire_failure_text(&err))
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn record_error(&self, task_id: TaskId, text: String) -> DispatchResult<()> {
        let comment = Comment::system_error(task_id, text, &*self.clock);
        self.tasks.append_comment(task_id, &comment).await?;
        Ok(())
    }
}
