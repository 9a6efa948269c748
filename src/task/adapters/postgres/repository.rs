//! `PostgreSQL` repository implementation for work-order storage.

use super::{
    models::{CommentRow, TaskRow, row_to_task, to_comment_row, to_task_row},
    schema::{comments, tasks},
};
use crate::task::{
    domain::{Comment, Status, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// `PostgreSQL` connection pool type used by work-order adapters.
pub type WorkOrderPgPool = Pool<ConnectionManager<PgConnection>>;

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: WorkOrderPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkOrderPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let version = i64::try_from(task.version()).map_err(TaskRepositoryError::persistence)?;
        let new_row = to_task_row(task, version)?;
        let comment_rows = task
            .comments()
            .iter()
            .map(to_comment_row)
            .collect::<TaskRepositoryResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                if !comment_rows.is_empty() {
                    diesel::insert_into(comments::table)
                        .values(&comment_rows)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let comment_rows = comments::table
                .filter(comments::task_id.eq(id.into_inner()))
                .order(comments::created_at.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)?;
            row_to_task(task_row, comment_rows).map(Some)
        })
        .await
    }

    async fn update_with_comment(
        &self,
        task: &Task,
        expected_version: u64,
        comment: &Comment,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let expected =
            i64::try_from(expected_version).map_err(TaskRepositoryError::persistence)?;
        let changed_row = to_task_row(task, expected + 1)?;
        let comment_row = to_comment_row(comment)?;

        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::version.eq(expected)),
                )
                .set(&changed_row)
                .execute(conn)?;

                if updated == 0 {
                    // Distinguish a stale snapshot from a vanished row.
                    let actual = tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .select(tasks::version)
                        .first::<i64>(conn)
                        .optional()?;
                    return Err(actual.map_or(
                        TaskRepositoryError::NotFound(task_id),
                        |found| TaskRepositoryError::Conflict {
                            task_id,
                            expected: expected_version,
                            actual: u64::try_from(found).unwrap_or_default(),
                        },
                    ));
                }

                diesel::insert_into(comments::table)
                    .values(&comment_row)
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn append_comment(
        &self,
        task_id: TaskId,
        comment: &Comment,
    ) -> TaskRepositoryResult<()> {
        let comment_row = to_comment_row(comment)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(comments::table)
                .values(&comment_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn record_notification_sent(
        &self,
        task_id: TaskId,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set((
                    tasks::notification_count.eq(tasks::notification_count + 1),
                    tasks::last_notification_at.eq(Some(at)),
                ))
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_due(
        &self,
        dates: &[NaiveDate],
        statuses: &[Status],
    ) -> TaskRepositoryResult<Vec<Task>> {
        let date_list = dates.to_vec();
        let status_strings: Vec<String> = statuses
            .iter()
            .map(|status| status.as_str().to_owned())
            .collect();

        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::actual_plan_date.eq_any(&date_list))
                .filter(tasks::status.eq_any(&status_strings))
                .order(tasks::actual_plan_date.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;

            let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
            let comment_rows = comments::table
                .filter(comments::task_id.eq_any(&ids))
                .order(comments::created_at.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)?;

            let mut grouped: HashMap<uuid::Uuid, Vec<CommentRow>> = HashMap::new();
            for comment_row in comment_rows {
                grouped.entry(comment_row.task_id).or_default().push(comment_row);
            }

            rows.into_iter()
                .map(|row| {
                    let history = grouped.remove(&row.id).unwrap_or_default();
                    row_to_task(row, history)
                })
                .collect()
        })
        .await
    }
}
