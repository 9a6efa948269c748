//! Daily reminder sweep over approaching plan dates.

use super::{DispatchResult, Dispatcher};
use crate::notify::{
    domain::{days_until, reminder_dates, reminder_event},
    ports::{Messenger, NotificationRepository},
};
use crate::task::{domain::NOTIFICATION_STATUSES, ports::TaskRepository};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Pause between consecutive reminder sends to avoid flooding the
/// transport.
const SEND_PACING: Duration = Duration::from_millis(100);

/// Sweeps tasks whose plan date is approaching and re-sends their cards.
pub struct ReminderService<N, M, R, C>
where
    N: NotificationRepository,
    M: Messenger,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    dispatcher: Dispatcher<N, M, R, C>,
    clock: Arc<C>,
}

impl<N, M, R, C> ReminderService<N, M, R, C>
where
    N: NotificationRepository,
    M: Messenger,
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new reminder service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, dispatcher: Dispatcher<N, M, R, C>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            dispatcher,
            clock,
        }
    }

    /// Runs one sweep for the current day.
    ///
    /// # Errors
    ///
    /// Returns a [`super::DispatchError`] when the due-task query fails. Per-task
    /// dispatch failures are logged and recorded without aborting the
    /// sweep.
    pub async fn run(&self) -> DispatchResult<usize> {
        self.run_for(self.clock.utc().date_naive()).await
    }

    /// Runs one sweep as if `today` were the current day.
    ///
    /// Reminders always resend rather than edit, so a fresh message lands
    /// at the top of each recipient's chat.
    ///
    /// # Errors
    ///
    /// Returns a [`super::DispatchError`] when the due-task query fails.
    pub async fn run_for(&self, today: NaiveDate) -> DispatchResult<usize> {
        let dates = reminder_dates(today);
        let due = self.tasks.find_due(&dates, &NOTIFICATION_STATUSES).await?;
        info!(count = due.len(), %today, "reminder sweep started");

        let mut delivered = 0usize;
        for task in due {
            let Some(days) = days_until(today, task.actual_plan_date()) else {
                continue;
            };
            let event = reminder_event(days);
            match self.dispatcher.notify_responsible(&task, &event, false).await {
                Ok(Some(_)) => delivered += 1,
                Ok(None) => {}
                Err(err) => {
                    error!(task_id = %task.id(), %err, "reminder dispatch failed");
                }
            }
            tokio::time::sleep(SEND_PACING).await;
        }
        info!(delivered, "reminder sweep finished");
        Ok(delivered)
    }
}