//! Behavioural tests for the notification dispatch engine.

use super::fixtures::{
    DispatchHarness, dispatch_harness, make_task, plan_date, seeded_task, supplier, user,
};
use crate::notify::ports::{NotificationRepository, TransportError};
use crate::task::{
    domain::{CommentKind, Status, Task, TaskId},
    ports::TaskRepository,
};
use eyre::{OptionExt, bail, ensure};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> DispatchHarness {
    dispatch_harness()
}

async fn stored(harness: &DispatchHarness, id: TaskId) -> eyre::Result<Task> {
    harness
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_eyre("task must exist in the repository")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delivers_to_the_responsible_party(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    let delivered = harness
        .dispatcher
        .notify_responsible(&task, "Обновление задачи", false)
        .await?;

    ensure!(delivered.is_some());
    let sent = harness.messenger.sent();
    ensure!(sent.len() == 1);
    let Some(message) = sent.first() else {
        bail!("one message must be recorded");
    };
    ensure!(message.chat == task.executor().chat());
    ensure!(message.text.starts_with("<b>Обновление задачи</b>"));

    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.len() == 1);
    let Some(record) = active.first() else {
        bail!("one active record must exist");
    };
    ensure!(record.user_id == task.executor().id());

    let persisted = stored(&harness, task.id()).await?;
    ensure!(persisted.notification_count() == 1);
    ensure!(
        persisted
            .comments()
            .iter()
            .any(|comment| matches!(comment.kind(), CommentKind::Notified))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_resend_retires_the_previous_message(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    let first = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;
    let second = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("second dispatch must deliver")?;

    ensure!(first != second);
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.len() == 1);
    ensure!(active.first().map(|record| record.message_id) == Some(second));
    ensure!(
        harness
            .messenger
            .deleted()
            .contains(&(task.executor().chat(), first))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_editable_event_rewrites_the_live_message(
    harness: DispatchHarness,
) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    let first = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;
    let second = harness
        .dispatcher
        .notify_responsible(&task, "Обновление задачи", true)
        .await?
        .ok_or_eyre("the edit must report the live message")?;

    ensure!(first == second);
    ensure!(harness.messenger.sent().len() == 1);
    ensure!(harness.messenger.edited().len() == 1);
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_unchanged_edit_counts_as_delivered(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    let first = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;
    harness.messenger.fail_next_edit(TransportError::NotModified);
    let second = harness
        .dispatcher
        .notify_responsible(&task, "событие", true)
        .await?
        .ok_or_eyre("an unchanged edit still reports the live message")?;

    ensure!(first == second);
    ensure!(harness.messenger.sent().len() == 1);
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_vanished_message_is_replaced_silently(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    let first = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;
    harness.messenger.fail_next_edit(TransportError::Gone);
    let second = harness
        .dispatcher
        .notify_responsible(&task, "событие", true)
        .await?
        .ok_or_eyre("the replacement must deliver")?;

    ensure!(first != second);
    // The vanished message is deactivated directly, never deleted again.
    ensure!(harness.messenger.deleted().is_empty());
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.len() == 1);
    ensure!(active.first().map(|record| record.message_id) == Some(second));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_terminal_status_retires_everything_and_sends_nothing(
    harness: DispatchHarness,
) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;
    let first = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;

    let mut done = task.to_persisted();
    done.status = Status::Done;
    let done_task = Task::from_persisted(done, Vec::new());
    let delivered = harness
        .dispatcher
        .notify_responsible(&done_task, "событие", true)
        .await?;

    ensure!(delivered.is_none());
    ensure!(harness.messenger.sent().len() == 1);
    ensure!(
        harness
            .messenger
            .deleted()
            .contains(&(task.executor().chat(), first))
    );
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_failed_send_is_recorded_and_absorbed(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;
    harness
        .messenger
        .fail_next_send(TransportError::Failed("timeout".to_owned()));

    let delivered = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?;

    ensure!(delivered.is_none());
    let active = harness.notifications.active_for_task(task.id()).await?;
    ensure!(active.is_empty());
    let persisted = stored(&harness, task.id()).await?;
    ensure!(persisted.notification_count() == 0);
    ensure!(persisted.comments().iter().any(|comment| matches!(
        comment.kind(),
        CommentKind::Error { text } if text.starts_with("Ошибка отправки уведомления:")
    )));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_failed_retirement_is_recorded_but_never_blocks(
    harness: DispatchHarness,
) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;
    harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?
        .ok_or_eyre("first dispatch must deliver")?;

    harness
        .messenger
        .fail_next_delete(TransportError::Failed("flood limit".to_owned()));
    let second = harness
        .dispatcher
        .notify_responsible(&task, "событие", false)
        .await?;

    ensure!(second.is_some());
    ensure!(harness.messenger.sent().len() == 2);
    let persisted = stored(&harness, task.id()).await?;
    ensure!(persisted.comments().iter().any(|comment| matches!(
        comment.kind(),
        CommentKind::Error { text }
            if text.starts_with("Ошибка удаления устаревшего уведомления:")
    )));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn broadcast_reaches_everyone_but_the_actor(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;

    harness
        .dispatcher
        .broadcast(&task, "Новый комментарий по задаче", task.executor().id())
        .await?;

    let sent = harness.messenger.sent();
    ensure!(sent.len() == 2);
    let chats: Vec<i64> = sent.iter().map(|message| message.chat.value()).collect();
    ensure!(chats.contains(&task.supplier().chat().value()));
    ensure!(chats.contains(&task.supervisor().chat().value()));
    ensure!(!chats.contains(&task.executor().chat().value()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn broadcast_deduplicates_shared_slots(harness: DispatchHarness) -> eyre::Result<()> {
    let person = user("Козлов", "Андрей", 400);
    let originator = supplier();
    let task = make_task(
        Status::Planning,
        plan_date(),
        originator.clone(),
        person.clone(),
        person.clone(),
    );
    harness.tasks.store(&task).await?;

    harness
        .dispatcher
        .broadcast(&task, "Новый комментарий по задаче", originator.id())
        .await?;

    ensure!(harness.messenger.sent().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retire_for_clears_only_the_given_recipient(harness: DispatchHarness) -> eyre::Result<()> {
    let task = seeded_task(&harness, Status::Planning).await?;
    harness
        .dispatcher
        .broadcast(&task, "Новый комментарий по задаче", task.executor().id())
        .await?;

    harness
        .dispatcher
        .retire_for(task.id(), task.supplier().id())
        .await?;

    let supplier_records = harness
        .notifications
        .active_for_recipient(task.id(), task.supplier().id())
        .await?;
    ensure!(supplier_records.is_empty());
    let supervisor_records = harness
        .notifications
        .active_for_recipient(task.id(), task.supervisor().id())
        .await?;
    ensure!(supervisor_records.len() == 1);
    Ok(())
}
