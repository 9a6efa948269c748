//! Orchestration tests for the transactional work-order operations.

use super::fixtures::{executor, new_task_data, supervisor, supplier, user};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{AssignedSlot, Comment, CommentKind, Status, Task, TaskDomainError, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
    services::{TaskOperationError, TaskOperations},
};
use chrono::NaiveDate;
use eyre::{OptionExt, bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestOperations = TaskOperations<InMemoryTaskRepository, DefaultClock>;

struct Harness {
    repository: Arc<InMemoryTaskRepository>,
    operations: TestOperations,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let operations = TaskOperations::new(Arc::clone(&repository), Arc::new(DefaultClock));
    Harness {
        repository,
        operations,
    }
}

async fn stored(repository: &InMemoryTaskRepository, id: TaskId) -> eyre::Result<Task> {
    repository
        .find_by_id(id)
        .await?
        .ok_or_eyre("task must exist in the repository")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_persists_and_is_retrievable(harness: Harness) -> eyre::Result<()> {
    let created = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;

    let fetched = harness.repository.find_by_id(created.id()).await?;
    ensure!(fetched == Some(created));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_commits_the_mutation_with_one_audit_entry(
    harness: Harness,
) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.executor().clone();

    harness
        .operations
        .status_change(&mut task, &actor, Status::Accepted, None)
        .await?;

    ensure!(task.status() == Status::Accepted);
    ensure!(task.version() == 1);
    let persisted = stored(&harness.repository, task.id()).await?;
    ensure!(persisted.status() == Status::Accepted);
    ensure!(persisted.version() == 1);
    ensure!(persisted.comments().len() == 1);
    let Some(entry) = persisted.comments().first() else {
        bail!("the committed audit entry must be loaded");
    };
    ensure!(matches!(
        entry.kind(),
        CommentKind::StatusChange {
            from: Status::Planning,
            to: Status::Accepted,
            reason: None,
        }
    ));
    Ok(())
}

#[rstest]
#[case(Status::Rejected)]
#[case(Status::Canceled)]
#[tokio::test(flavor = "multi_thread")]
async fn negative_statuses_require_a_reason(
    harness: Harness,
    #[case] target: Status,
) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.supplier().clone();

    let result = harness
        .operations
        .status_change(&mut task, &actor, target, Some("   ".to_owned()))
        .await;

    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(
            TaskDomainError::StatusCommentRequired(status)
        )) if status == target
    ));
    let persisted = stored(&harness.repository, task.id()).await?;
    ensure!(persisted.status() == Status::Planning);
    ensure!(persisted.comments().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_guest_cannot_move_the_task(harness: Harness) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let outsider = user("Никитин", "Глеб", 900);

    let result = harness
        .operations
        .status_change(&mut task, &outsider, Status::Accepted, None)
        .await;

    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(
            TaskDomainError::InvalidTransition { .. }
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_stale_snapshot_is_rejected_with_a_conflict(harness: Harness) -> eyre::Result<()> {
    let created = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let mut first = stored(&harness.repository, created.id()).await?;
    let mut second = stored(&harness.repository, created.id()).await?;
    let actor = created.executor().clone();

    harness
        .operations
        .status_change(&mut first, &actor, Status::Accepted, None)
        .await?;
    let result = harness
        .operations
        .status_change(&mut second, &actor, Status::Rejected, Some("занят".to_owned()))
        .await;

    let Err(err) = result else {
        bail!("the second writer must observe a conflict");
    };
    ensure!(err.is_conflict());
    let persisted = stored(&harness.repository, created.id()).await?;
    ensure!(persisted.status() == Status::Accepted);
    ensure!(persisted.version() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_supplier_reschedules_without_a_reason(harness: Harness) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.supplier().clone();
    let Some(new_date) = NaiveDate::from_ymd_opt(2030, 9, 6) else {
        bail!("date must be valid");
    };

    harness
        .operations
        .date_change(&mut task, &actor, new_date, None)
        .await?;

    ensure!(task.actual_plan_date() == new_date);
    ensure!(task.reschedule_count() == 1);
    let persisted = stored(&harness.repository, task.id()).await?;
    ensure!(persisted.actual_plan_date() == new_date);
    ensure!(matches!(
        persisted.comments().first().map(Comment::kind),
        Some(CommentKind::DateChange { reason: None, .. })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_roles_must_justify_a_reschedule(harness: Harness) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.executor().clone();
    let Some(new_date) = NaiveDate::from_ymd_opt(2030, 9, 6) else {
        bail!("date must be valid");
    };

    let result = harness
        .operations
        .date_change(&mut task, &actor, new_date, None)
        .await;
    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(
            TaskDomainError::DateCommentRequired
        ))
    ));

    harness
        .operations
        .date_change(&mut task, &actor, new_date, Some("ждём поставку".to_owned()))
        .await?;
    ensure!(task.actual_plan_date() == new_date);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reschedule_validation_rejects_bad_dates(harness: Harness) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.supplier().clone();
    let Some(past) = NaiveDate::from_ymd_opt(2020, 1, 1) else {
        bail!("date must be valid");
    };

    let result = harness
        .operations
        .date_change(&mut task, &actor, past, None)
        .await;
    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(TaskDomainError::DateInPast(_)))
    ));

    let unchanged = task.actual_plan_date();
    let result = harness
        .operations
        .date_change(&mut task, &actor, unchanged, None)
        .await;
    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(TaskDomainError::SamePlanDate(_)))
    ));

    let outsider = user("Никитин", "Глеб", 900);
    let Some(future) = NaiveDate::from_ymd_opt(2030, 9, 9) else {
        bail!("date must be valid");
    };
    let result = harness
        .operations
        .date_change(&mut task, &outsider, future, None)
        .await;
    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(
            TaskDomainError::DateChangeForbidden
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassignment_swaps_the_slot_and_records_the_handover(
    harness: Harness,
) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.supplier().clone();
    let replacement = user("Фёдоров", "Илья", 500);

    harness
        .operations
        .reassign(&mut task, &actor, AssignedSlot::Executor, replacement.clone())
        .await?;

    ensure!(task.executor() == &replacement);
    let persisted = stored(&harness.repository, task.id()).await?;
    ensure!(persisted.executor() == &replacement);
    let Some(entry) = persisted.comments().first() else {
        bail!("the handover must be logged");
    };
    let CommentKind::Reassignment {
        slot,
        old_user,
        new_user,
    } = entry.kind()
    else {
        bail!("expected a reassignment entry, got {:?}", entry.kind());
    };
    ensure!(*slot == AssignedSlot::Executor);
    ensure!(old_user.name == "Петров Семён");
    ensure!(new_user.id == replacement.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_note_does_not_bump_the_task_version(harness: Harness) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let actor = task.executor().clone();

    harness
        .operations
        .add_note(&mut task, &actor, "нужен доступ к щитовой")
        .await?;

    ensure!(task.version() == 0);
    let persisted = stored(&harness.repository, task.id()).await?;
    ensure!(persisted.version() == 0);
    ensure!(persisted.comments().len() == 1);
    let Some(entry) = persisted.comments().first() else {
        bail!("the note must be stored");
    };
    ensure!(entry.is_note());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_canceled_task_can_only_be_reopened_by_the_supplier(
    harness: Harness,
) -> eyre::Result<()> {
    let mut task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;
    let originator = task.supplier().clone();
    let doer = task.executor().clone();

    harness
        .operations
        .status_change(
            &mut task,
            &originator,
            Status::Canceled,
            Some("объект закрыт".to_owned()),
        )
        .await?;
    ensure!(task.status() == Status::Canceled);

    let result = harness
        .operations
        .status_change(&mut task, &doer, Status::Accepted, None)
        .await;
    ensure!(matches!(
        result,
        Err(TaskOperationError::Domain(
            TaskDomainError::InvalidTransition { .. }
        ))
    ));

    harness
        .operations
        .status_change(&mut task, &originator, Status::Planning, None)
        .await?;
    ensure!(task.status() == Status::Planning);
    ensure!(task.version() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_task_twice_is_rejected(harness: Harness) -> eyre::Result<()> {
    let task = harness
        .operations
        .create(new_task_data(supplier(), executor(), supervisor()))
        .await?;

    let result = harness.repository.store(&task).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
    Ok(())
}
