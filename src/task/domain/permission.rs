//! Derived, non-persisted permission snapshot for one (task, user) pair.

use super::{Role, RoleSet, Status};

/// What a user may currently do with a task.
///
/// Computed on demand from a fully loaded task snapshot; cheap enough that
/// no caching layer is warranted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSnapshot {
    /// Roles the user holds on the task.
    pub roles: RoleSet,
    /// Statuses the user may transition the task into, per the table.
    pub available_statuses: Vec<Status>,
    /// Whether the user may change the planned date.
    pub can_change_date: bool,
    /// Whether a comment is mandatory when changing the date.
    pub must_comment_date: bool,
}

impl PermissionSnapshot {
    /// Composes the snapshot from a role set and the task's current status.
    ///
    /// Suppliers may silently reschedule; every other role must justify a
    /// date change in a comment. Date changes are open to suppliers and to
    /// anyone who currently holds at least one status transition.
    #[must_use]
    pub fn compute(current: Status, roles: RoleSet) -> Self {
        let available_statuses = super::available_statuses(current, roles);
        let is_supplier = roles.contains(Role::Supplier);
        Self {
            roles,
            can_change_date: is_supplier || !available_statuses.is_empty(),
            must_comment_date: !is_supplier,
            available_statuses,
        }
    }
}
