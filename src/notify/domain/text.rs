//! Russian message texts for notifications and audit entries.

use crate::task::domain::{Status, Task};

/// Event header for a same-status refresh request.
pub const REFRESH_EVENT: &str = "Обновление задачи";

/// Event header for a new free-text comment.
pub const COMMENT_EVENT: &str = "Новый комментарий по задаче";

/// Note text recorded when a user acknowledges the task card.
pub const ACKNOWLEDGE_NOTE: &str = "Ознакомился с описанием и комментариями в телеграм";

/// Picks the grammatical form of "день" for a day count.
#[must_use]
pub fn days_text(days: u32) -> &'static str {
    if (11..=14).contains(&(days % 100)) {
        return "дней";
    }
    match days % 10 {
        1 => "день",
        2..=4 => "дня",
        _ => "дней",
    }
}

/// Event header for a deadline reminder.
#[must_use]
pub fn reminder_event(days: u32) -> String {
    format!("Напоминание о задаче со сроком через {days} {}", days_text(days))
}

/// Event header for a status change, addressed to the new responsible
/// party when one exists.
#[must_use]
pub fn status_event(task: &Task, new_status: Status) -> String {
    let header = format!("Новая задача в статусе: {}", new_status.label());
    task.whom_notify().map_or_else(
        || header.clone(),
        |recipient| {
            format!(
                "{header}\nВаша роль: {}",
                task.roles_of(recipient.id()).labels()
            )
        },
    )
}

/// Event header for a plan-date change.
#[must_use]
pub fn date_event(task: &Task) -> String {
    format!(
        "Смена плановой даты задачи на\n{}",
        task.formatted_plan_date()
    )
}

/// Audit text for a failed message delivery.
#[must_use]
pub fn send_failure_text(err: &impl std::fmt::Display) -> String {
    format!("Ошибка отправки уведомления:\n{err}")
}

/// Audit text for a failed retirement of a stale message.
#[must_use]
pub fn retire_failure_text(err: &impl std::fmt::Display) -> String {
    format!("Ошибка удаления устаревшего уведомления:\n{err}")
}

/// Audit text recorded when no bucket claims the task's status.
#[must_use]
pub fn no_responsible_text(status: Status) -> String {
    format!(
        "Не получилось определить ответственного за статус {}",
        status.label()
    )
}
