//! Workflow statuses and the role-gated transition table.

use super::{ParseStatusError, Role, RoleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Workflow stage of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Task exists but is not yet handed to anyone.
    Draft,
    /// Task is being scheduled and assigned.
    Planning,
    /// Executor accepted the task.
    Accepted,
    /// Executor rejected the task.
    Rejected,
    /// Work finished, awaiting supervisor review.
    Review,
    /// Task was canceled by the supplier.
    Canceled,
    /// Supervisor sent the task back for rework.
    Rework,
    /// Task accepted as complete.
    Done,
}

/// All statuses in declaration order.
pub const ALL_STATUSES: [Status; 8] = [
    Status::Draft,
    Status::Planning,
    Status::Accepted,
    Status::Rejected,
    Status::Review,
    Status::Canceled,
    Status::Rework,
    Status::Done,
];

/// Statuses eligible for reminder notifications: everything except drafts
/// and completed work.
pub const NOTIFICATION_STATUSES: [Status; 5] = [
    Status::Planning,
    Status::Accepted,
    Status::Rejected,
    Status::Review,
    Status::Rework,
];

/// Statuses whose responsible party is the supervisor.
pub const SUPERVISOR_STATUSES: [Status; 1] = [Status::Review];

/// Statuses whose responsible party is the executor.
pub const EXECUTOR_STATUSES: [Status; 3] = [Status::Planning, Status::Accepted, Status::Rework];

/// Statuses the supplier keeps visibility into; nearly every active stage,
/// since the originator wants to follow the whole lifecycle.
pub const SUPPLIER_STATUSES: [Status; 6] = [
    Status::Draft,
    Status::Planning,
    Status::Accepted,
    Status::Rejected,
    Status::Review,
    Status::Rework,
];

/// Statuses that require a justification comment when entered.
pub const SHOULD_BE_COMMENTED: [Status; 3] = [Status::Rejected, Status::Rework, Status::Canceled];

impl Status {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Planning => "planning",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Review => "review",
            Self::Canceled => "canceled",
            Self::Rework => "rework",
            Self::Done => "done",
        }
    }

    /// Human-readable label shown in messages and the web UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Черновик",
            Self::Planning => "Планирование",
            Self::Accepted => "Принято",
            Self::Rejected => "Отклонено",
            Self::Review => "Проверка",
            Self::Canceled => "Отменена",
            Self::Rework => "Доработка",
            Self::Done => "Выполнено",
        }
    }

    /// Whether the status is terminal (`Done` or `Canceled`).
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }

    /// Whether a justification comment is mandatory when entering this status.
    #[must_use]
    pub fn requires_comment(self) -> bool {
        SHOULD_BE_COMMENTED.contains(&self)
    }
}

impl TryFrom<&str> for Status {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(Self::Draft),
            "planning" => Ok(Self::Planning),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "review" => Ok(Self::Review),
            "canceled" => Ok(Self::Canceled),
            "rework" => Ok(Self::Rework),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed role-gated transition table, built once at startup.
///
/// Cancellation is deliberately absent: moving into or out of `Canceled` is
/// a supplier-only escape hatch handled by [`is_valid_transition`] directly.
static TRANSITIONS: LazyLock<HashMap<(Role, Status), &'static [Status]>> = LazyLock::new(|| {
    HashMap::from([
        ((Role::Supplier, Status::Draft), &[Status::Planning] as &[_]),
        ((Role::Supplier, Status::Canceled), &[Status::Planning] as &[_]),
        ((Role::Supplier, Status::Rejected), &[Status::Planning] as &[_]),
        ((Role::Supplier, Status::Done), &[Status::Rework] as &[_]),
        ((Role::Supplier, Status::Planning), &[Status::Draft] as &[_]),
        (
            (Role::Executor, Status::Planning),
            &[Status::Accepted, Status::Rejected] as &[_],
        ),
        (
            (Role::Executor, Status::Accepted),
            &[Status::Review, Status::Rejected] as &[_],
        ),
        ((Role::Executor, Status::Rejected), &[Status::Accepted] as &[_]),
        ((Role::Executor, Status::Rework), &[Status::Review] as &[_]),
        (
            (Role::Supervisor, Status::Review),
            &[Status::Done, Status::Rework] as &[_],
        ),
    ])
});

/// Whether a user holding `roles` may move a task from `current` to `new`.
///
/// Moving into or out of `Canceled` is permitted for suppliers regardless of
/// the table. Requesting the current status again is not a transition and
/// always returns `false`; callers treat it as a refresh.
#[must_use]
pub fn is_valid_transition(current: Status, new: Status, roles: RoleSet) -> bool {
    if new == current {
        return false;
    }
    if new == Status::Canceled || current == Status::Canceled {
        return roles.contains(Role::Supplier);
    }
    roles.assigned().any(|role| {
        TRANSITIONS
            .get(&(role, current))
            .is_some_and(|targets| targets.contains(&new))
    })
}

/// Union of table-permitted target statuses for a role set, in declaration
/// order. An empty result means the holder may only acknowledge the task.
#[must_use]
pub fn available_statuses(current: Status, roles: RoleSet) -> Vec<Status> {
    ALL_STATUSES
        .into_iter()
        .filter(|target| {
            roles.assigned().any(|role| {
                TRANSITIONS
                    .get(&(role, current))
                    .is_some_and(|targets| targets.contains(target))
            })
        })
        .collect()
}
