//! Roles a user holds on a specific task.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's relationship to one task.
///
/// Roles are never stored on the user; they are computed per task by
/// comparing the user against the task's three assignment slots. A user may
/// hold several roles on the same task at once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Originator of the task.
    Supplier,
    /// The person doing the work.
    Executor,
    /// The approver who reviews finished work.
    Supervisor,
    /// No assignment matched.
    Guest,
}

impl Role {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Supplier => "Постановщик",
            Self::Executor => "Исполнитель",
            Self::Supervisor => "Руководитель",
            Self::Guest => "Гость",
        }
    }

    /// First letter of the label, used in compact comment lines.
    #[must_use]
    pub fn initial(self) -> String {
        self.label().chars().next().map(String::from).unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The set of roles one user holds on one task.
///
/// Never empty: when no assignment slot matches, the set reports `Guest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    supplier: bool,
    executor: bool,
    supervisor: bool,
}

impl RoleSet {
    /// Builds a role set from independent slot matches.
    #[must_use]
    pub const fn new(supplier: bool, executor: bool, supervisor: bool) -> Self {
        Self {
            supplier,
            executor,
            supervisor,
        }
    }

    /// Whether the set contains the given role.
    ///
    /// `Guest` is contained exactly when no assignment matched.
    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        match role {
            Role::Supplier => self.supplier,
            Role::Executor => self.executor,
            Role::Supervisor => self.supervisor,
            Role::Guest => self.is_guest(),
        }
    }

    /// Whether no assignment slot matched.
    #[must_use]
    pub const fn is_guest(self) -> bool {
        !(self.supplier || self.executor || self.supervisor)
    }

    /// Iterates the assigned (non-guest) roles.
    pub fn assigned(self) -> impl Iterator<Item = Role> {
        [
            (Role::Supplier, self.supplier),
            (Role::Executor, self.executor),
            (Role::Supervisor, self.supervisor),
        ]
        .into_iter()
        .filter_map(|(role, held)| held.then_some(role))
    }

    /// Materialises the set, yielding `[Guest]` when nothing is assigned.
    #[must_use]
    pub fn to_vec(self) -> Vec<Role> {
        if self.is_guest() {
            return vec![Role::Guest];
        }
        self.assigned().collect()
    }

    /// Comma-joined role labels for message rendering.
    #[must_use]
    pub fn labels(self) -> String {
        self.to_vec()
            .into_iter()
            .map(Role::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
