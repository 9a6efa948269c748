//! Task aggregate root and derived queries.

use super::{
    AssignedSlot, Comment, EXECUTOR_STATUSES, PermissionSnapshot, RoleSet, SUPERVISOR_STATUSES,
    SUPPLIER_STATUSES, Status, TaskDomainError, TaskId, User, UserId, is_valid_transition,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object for creating a fresh task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Short title of the work order.
    pub title: String,
    /// Work-order category label.
    pub task_type: String,
    /// Object or location the work applies to.
    pub object: String,
    /// Initial status; must be `Draft` or `Planning`.
    pub status: Status,
    /// Originator of the task.
    pub supplier: User,
    /// Approver who reviews finished work.
    pub supervisor: User,
    /// The person doing the work.
    pub executor: User,
    /// Planned completion date.
    pub initial_plan_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Whether the task is flagged as important.
    pub important: bool,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted category label.
    pub task_type: String,
    /// Persisted object label.
    pub object: String,
    /// Persisted status.
    pub status: Status,
    /// Persisted supplier record.
    pub supplier: User,
    /// Persisted supervisor record.
    pub supervisor: User,
    /// Persisted executor record.
    pub executor: User,
    /// Persisted initial plan date.
    pub initial_plan_date: NaiveDate,
    /// Persisted actual plan date.
    pub actual_plan_date: NaiveDate,
    /// Persisted description.
    pub description: String,
    /// Persisted importance flag.
    pub important: bool,
    /// Times the task was sent back for rework.
    pub rework_count: u32,
    /// Times the plan date was moved.
    pub reschedule_count: u32,
    /// Notifications successfully delivered for this task.
    pub notification_count: u32,
    /// When the last notification went out, if ever.
    pub last_notification_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version of the persisted row.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One unit of work tracked by the system.
///
/// The aggregate carries its full comment history and its three assigned
/// users so that every derived query is pure: no method reaches back into
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: String,
    task_type: String,
    object: String,
    status: Status,
    supplier: User,
    supervisor: User,
    executor: User,
    initial_plan_date: NaiveDate,
    actual_plan_date: NaiveDate,
    description: String,
    important: bool,
    rework_count: u32,
    reschedule_count: u32,
    notification_count: u32,
    last_notification_at: Option<DateTime<Utc>>,
    comments: Vec<Comment>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    ///
    /// The actual plan date starts equal to the initial plan date and only
    /// moves through [`Task::change_plan_date`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidInitialStatus`] unless the status
    /// is `Draft` or `Planning`.
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        if !matches!(data.status, Status::Draft | Status::Planning) {
            return Err(TaskDomainError::InvalidInitialStatus(data.status));
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title: data.title,
            task_type: data.task_type,
            object: data.object,
            status: data.status,
            supplier: data.supplier,
            supervisor: data.supervisor,
            executor: data.executor,
            initial_plan_date: data.initial_plan_date,
            actual_plan_date: data.initial_plan_date,
            description: data.description,
            important: data.important,
            rework_count: 0,
            reschedule_count: 0,
            notification_count: 0,
            last_notification_at: None,
            comments: Vec::new(),
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// `comments` must already be sorted by creation time.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData, comments: Vec<Comment>) -> Self {
        Self {
            id: data.id,
            title: data.title,
            task_type: data.task_type,
            object: data.object,
            status: data.status,
            supplier: data.supplier,
            supervisor: data.supervisor,
            executor: data.executor,
            initial_plan_date: data.initial_plan_date,
            actual_plan_date: data.actual_plan_date,
            description: data.description,
            important: data.important,
            rework_count: data.rework_count,
            reschedule_count: data.reschedule_count,
            notification_count: data.notification_count,
            last_notification_at: data.last_notification_at,
            comments,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Snapshot of the persistable scalar state.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            title: self.title.clone(),
            task_type: self.task_type.clone(),
            object: self.object.clone(),
            status: self.status,
            supplier: self.supplier.clone(),
            supervisor: self.supervisor.clone(),
            executor: self.executor.clone(),
            initial_plan_date: self.initial_plan_date,
            actual_plan_date: self.actual_plan_date,
            description: self.description.clone(),
            important: self.important,
            rework_count: self.rework_count,
            reschedule_count: self.reschedule_count,
            notification_count: self.notification_count,
            last_notification_at: self.last_notification_at,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the category label.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Returns the object/location label.
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the supplier (originator).
    #[must_use]
    pub const fn supplier(&self) -> &User {
        &self.supplier
    }

    /// Returns the supervisor (approver).
    #[must_use]
    pub const fn supervisor(&self) -> &User {
        &self.supervisor
    }

    /// Returns the executor (doer).
    #[must_use]
    pub const fn executor(&self) -> &User {
        &self.executor
    }

    /// Returns the initial plan date.
    #[must_use]
    pub const fn initial_plan_date(&self) -> NaiveDate {
        self.initial_plan_date
    }

    /// Returns the actual (possibly rescheduled) plan date.
    #[must_use]
    pub const fn actual_plan_date(&self) -> NaiveDate {
        self.actual_plan_date
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the task is flagged as important.
    #[must_use]
    pub const fn important(&self) -> bool {
        self.important
    }

    /// Times the task was sent back for rework.
    #[must_use]
    pub const fn rework_count(&self) -> u32 {
        self.rework_count
    }

    /// Times the plan date was moved.
    #[must_use]
    pub const fn reschedule_count(&self) -> u32 {
        self.reschedule_count
    }

    /// Notifications successfully delivered for this task.
    #[must_use]
    pub const fn notification_count(&self) -> u32 {
        self.notification_count
    }

    /// When the last notification went out, if ever.
    #[must_use]
    pub const fn last_notification_at(&self) -> Option<DateTime<Utc>> {
        self.last_notification_at
    }

    /// Full audit history in creation order.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Optimistic-concurrency version of the loaded snapshot.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Computes the roles `user_id` holds on this task.
    ///
    /// The three slots are compared independently; one person may fill
    /// several. The result is never empty: `Guest` is implied when nothing
    /// matches.
    #[must_use]
    pub fn roles_of(&self, user_id: UserId) -> RoleSet {
        RoleSet::new(
            self.supplier.id() == user_id,
            self.executor.id() == user_id,
            self.supervisor.id() == user_id,
        )
    }

    /// Composes the permission snapshot for `user_id`.
    #[must_use]
    pub fn permission_for(&self, user_id: UserId) -> PermissionSnapshot {
        PermissionSnapshot::compute(self.status, self.roles_of(user_id))
    }

    /// Resolves who must be notified of the task's current state.
    ///
    /// Bucket order matters and is not the permission-check order: the
    /// supervisor-owned statuses win, then executor-owned, then
    /// supplier-owned. `None` means no bucket claims the status; callers
    /// record that as an operational error rather than crashing.
    #[must_use]
    pub fn whom_notify(&self) -> Option<&User> {
        if SUPERVISOR_STATUSES.contains(&self.status) {
            Some(&self.supervisor)
        } else if EXECUTOR_STATUSES.contains(&self.status) {
            Some(&self.executor)
        } else if SUPPLIER_STATUSES.contains(&self.status) {
            Some(&self.supplier)
        } else {
            None
        }
    }

    /// Applies a validated status transition.
    ///
    /// Entering `Rework` increments the rework counter.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the caller's
    /// roles do not permit the move; the task is left untouched.
    pub fn update_status(
        &mut self,
        new_status: Status,
        roles: RoleSet,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !is_valid_transition(self.status, new_status, roles) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        if new_status == Status::Rework {
            self.rework_count += 1;
        }
        self.touch(clock);
        Ok(())
    }

    /// Moves the actual plan date and counts the reschedule.
    pub fn change_plan_date(&mut self, new_date: NaiveDate, clock: &impl Clock) {
        self.actual_plan_date = new_date;
        self.reschedule_count += 1;
        self.touch(clock);
    }

    /// Replaces the occupant of an assignment slot, returning the previous
    /// occupant.
    pub fn reassign(&mut self, slot: AssignedSlot, new_user: User, clock: &impl Clock) -> User {
        let previous = match slot {
            AssignedSlot::Supervisor => std::mem::replace(&mut self.supervisor, new_user),
            AssignedSlot::Executor => std::mem::replace(&mut self.executor, new_user),
        };
        self.touch(clock);
        previous
    }

    /// Appends a freshly committed audit entry to the loaded history.
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Marks the local snapshot as matching a newly committed version.
    pub(crate) const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Renders the actual plan date, appending the signed slippage in days
    /// when it differs from the initial plan, e.g. `02.09.2026 +5д.`.
    #[must_use]
    pub fn formatted_plan_date(&self) -> String {
        let date = self.actual_plan_date.format("%d.%m.%Y");
        let delta = (self.actual_plan_date - self.initial_plan_date).num_days();
        if delta == 0 {
            date.to_string()
        } else {
            format!("{date} {delta:+}д.")
        }
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
