//! Diesel row models and domain conversions for work-order persistence.

use super::schema::{comments, tasks};
use crate::task::{
    domain::{
        Comment, CommentAuthor, CommentId, CommentKind, PersistedCommentData, PersistedTaskData,
        Role, Status, Task, TaskId, User,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Short title.
    pub title: String,
    /// Category label.
    pub task_type: String,
    /// Object label.
    pub object: String,
    /// Workflow status.
    pub status: String,
    /// Supplier snapshot.
    pub supplier: Value,
    /// Supervisor snapshot.
    pub supervisor: Value,
    /// Executor snapshot.
    pub executor: Value,
    /// Initial plan date.
    pub initial_plan_date: NaiveDate,
    /// Actual plan date.
    pub actual_plan_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Importance flag.
    pub important: bool,
    /// Rework counter.
    pub rework_count: i32,
    /// Reschedule counter.
    pub reschedule_count: i32,
    /// Notification counter.
    pub notification_count: i32,
    /// Last notification timestamp.
    pub last_notification_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert/update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Short title.
    pub title: String,
    /// Category label.
    pub task_type: String,
    /// Object label.
    pub object: String,
    /// Workflow status.
    pub status: String,
    /// Supplier snapshot.
    pub supplier: Value,
    /// Supervisor snapshot.
    pub supervisor: Value,
    /// Executor snapshot.
    pub executor: Value,
    /// Initial plan date.
    pub initial_plan_date: NaiveDate,
    /// Actual plan date.
    pub actual_plan_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Importance flag.
    pub important: bool,
    /// Rework counter.
    pub rework_count: i32,
    /// Reschedule counter.
    pub reschedule_count: i32,
    /// Notification counter.
    pub notification_count: i32,
    /// Last notification timestamp.
    pub last_notification_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Author snapshot.
    pub author: Option<Value>,
    /// Role tags.
    pub author_roles: Value,
    /// Typed payload.
    pub payload: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    /// Comment identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Author snapshot.
    pub author: Option<Value>,
    /// Role tags.
    pub author_roles: Value,
    /// Typed payload.
    pub payload: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Builds the writable row for a task snapshot at `version`.
pub fn to_task_row(task: &Task, version: i64) -> TaskRepositoryResult<NewTaskRow> {
    let counters = [
        task.rework_count(),
        task.reschedule_count(),
        task.notification_count(),
    ]
    .map(i32::try_from);
    let [rework_count, reschedule_count, notification_count] = counters;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        task_type: task.task_type().to_owned(),
        object: task.object().to_owned(),
        status: task.status().as_str().to_owned(),
        supplier: serde_json::to_value(task.supplier()).map_err(TaskRepositoryError::persistence)?,
        supervisor: serde_json::to_value(task.supervisor())
            .map_err(TaskRepositoryError::persistence)?,
        executor: serde_json::to_value(task.executor()).map_err(TaskRepositoryError::persistence)?,
        initial_plan_date: task.initial_plan_date(),
        actual_plan_date: task.actual_plan_date(),
        description: task.description().to_owned(),
        important: task.important(),
        rework_count: rework_count.map_err(TaskRepositoryError::persistence)?,
        reschedule_count: reschedule_count.map_err(TaskRepositoryError::persistence)?,
        notification_count: notification_count.map_err(TaskRepositoryError::persistence)?,
        last_notification_at: task.last_notification_at(),
        version,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

/// Builds the insert row for an audit entry.
pub fn to_comment_row(comment: &Comment) -> TaskRepositoryResult<NewCommentRow> {
    Ok(NewCommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        author: comment
            .author()
            .map(serde_json::to_value)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        author_roles: serde_json::to_value(comment.author_roles())
            .map_err(TaskRepositoryError::persistence)?,
        payload: serde_json::to_value(comment.kind()).map_err(TaskRepositoryError::persistence)?,
        created_at: comment.created_at(),
    })
}

/// Reconstructs a task aggregate from its row and pre-sorted comment rows.
pub fn row_to_task(row: TaskRow, comment_rows: Vec<CommentRow>) -> TaskRepositoryResult<Task> {
    let status =
        Status::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let supplier: User =
        serde_json::from_value(row.supplier).map_err(TaskRepositoryError::persistence)?;
    let supervisor: User =
        serde_json::from_value(row.supervisor).map_err(TaskRepositoryError::persistence)?;
    let executor: User =
        serde_json::from_value(row.executor).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        task_type: row.task_type,
        object: row.object,
        status,
        supplier,
        supervisor,
        executor,
        initial_plan_date: row.initial_plan_date,
        actual_plan_date: row.actual_plan_date,
        description: row.description,
        important: row.important,
        rework_count: u32::try_from(row.rework_count)
            .map_err(TaskRepositoryError::persistence)?,
        reschedule_count: u32::try_from(row.reschedule_count)
            .map_err(TaskRepositoryError::persistence)?,
        notification_count: u32::try_from(row.notification_count)
            .map_err(TaskRepositoryError::persistence)?,
        last_notification_at: row.last_notification_at,
        version: u64::try_from(row.version).map_err(TaskRepositoryError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };

    let comments = comment_rows
        .into_iter()
        .map(row_to_comment)
        .collect::<TaskRepositoryResult<Vec<_>>>()?;
    Ok(Task::from_persisted(data, comments))
}

/// Reconstructs one audit entry from its row.
pub fn row_to_comment(row: CommentRow) -> TaskRepositoryResult<Comment> {
    let author: Option<CommentAuthor> = row
        .author
        .map(serde_json::from_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let author_roles: Vec<Role> =
        serde_json::from_value(row.author_roles).map_err(TaskRepositoryError::persistence)?;
    let kind: CommentKind =
        serde_json::from_value(row.payload).map_err(TaskRepositoryError::persistence)?;

    Ok(Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        author,
        author_roles,
        kind,
        created_at: row.created_at,
    }))
}
