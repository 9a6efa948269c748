//! Append-only audit log entries attached to a task.

use super::{CommentId, Role, RoleSet, Status, TaskId, User, UserId, UserRef};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Assignment slot affected by a role reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedSlot {
    /// The supervisor (approver) slot.
    Supervisor,
    /// The executor (doer) slot.
    Executor,
}

impl AssignedSlot {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Supervisor => "Руководитель",
            Self::Executor => "Исполнитель",
        }
    }
}

/// Typed payload of an audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentKind {
    /// Free-text remark from a user.
    Note {
        /// The remark.
        text: String,
    },
    /// Record of a validated status transition.
    StatusChange {
        /// Status before the change.
        from: Status,
        /// Status after the change.
        to: Status,
        /// Optional justification supplied by the actor.
        reason: Option<String>,
    },
    /// Record of a plan-date reschedule.
    DateChange {
        /// Plan date before the change.
        from: NaiveDate,
        /// Plan date after the change.
        to: NaiveDate,
        /// Optional justification supplied by the actor.
        reason: Option<String>,
    },
    /// Record of an assignment-slot handover.
    Reassignment {
        /// Which slot changed hands.
        slot: AssignedSlot,
        /// Previous occupant.
        old_user: UserRef,
        /// New occupant.
        new_user: UserRef,
    },
    /// Operational error surfaced for operators, e.g. a failed delivery.
    Error {
        /// Error description.
        text: String,
    },
    /// Bookkeeping marker: a notification was sent to the comment's user.
    Notified,
}

/// Author snapshot captured when the entry was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    /// Acting user identifier.
    pub user_id: UserId,
    /// Compact display name at write time.
    pub short_name: String,
}

/// One immutable audit entry.
///
/// Entries are created once and never mutated or deleted; their creation
/// order is the durable history of the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    task_id: TaskId,
    author: Option<CommentAuthor>,
    author_roles: Vec<Role>,
    kind: CommentKind,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted author snapshot, if any.
    pub author: Option<CommentAuthor>,
    /// Persisted author role tags.
    pub author_roles: Vec<Role>,
    /// Persisted payload.
    pub kind: CommentKind,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new audit entry authored by `actor` holding `roles`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        actor: Option<&User>,
        roles: RoleSet,
        kind: CommentKind,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: CommentId::new(),
            task_id,
            author: actor.map(|user| CommentAuthor {
                user_id: user.id(),
                short_name: user.short_name(),
            }),
            author_roles: actor.map(|_| roles.to_vec()).unwrap_or_default(),
            kind,
            created_at: clock.utc(),
        }
    }

    /// Creates a system error entry with no acting user.
    #[must_use]
    pub fn system_error(task_id: TaskId, text: impl Into<String>, clock: &impl Clock) -> Self {
        Self::new(
            task_id,
            None,
            RoleSet::default(),
            CommentKind::Error { text: text.into() },
            clock,
        )
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            author: data.author,
            author_roles: data.author_roles,
            kind: data.kind,
            created_at: data.created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author snapshot, if a user acted.
    #[must_use]
    pub const fn author(&self) -> Option<&CommentAuthor> {
        self.author.as_ref()
    }

    /// Role tags the author held at write time.
    #[must_use]
    pub fn author_roles(&self) -> &[Role] {
        &self.author_roles
    }

    /// Returns the typed payload.
    #[must_use]
    pub const fn kind(&self) -> &CommentKind {
        &self.kind
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this is a free-text remark.
    #[must_use]
    pub const fn is_note(&self) -> bool {
        matches!(self.kind, CommentKind::Note { .. })
    }
}
