//! User records attached to work-order tasks.

use super::{ChatId, UserId};
use serde::{Deserialize, Serialize};

/// A registered user who can be assigned to tasks and receive notifications.
///
/// The task aggregate carries full user records for its three assignment
/// slots so that role computation and notification addressing never require
/// a lazy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    chat: ChatId,
}

impl User {
    /// Creates a user record.
    #[must_use]
    pub fn new(
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        chat: ChatId,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            chat,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the chat identity notifications are delivered to.
    #[must_use]
    pub const fn chat(&self) -> ChatId {
        self.chat
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Full display name, surname first.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Compact display name used in comment lines: surname plus initial.
    #[must_use]
    pub fn short_name(&self) -> String {
        self.first_name.chars().next().map_or_else(
            || self.last_name.clone(),
            |initial| format!("{} {initial}.", self.last_name),
        )
    }
}

/// Minimal user reference stored inside structured audit payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Referenced user identifier.
    pub id: UserId,
    /// Display name captured at write time.
    pub name: String,
}

impl UserRef {
    /// Captures a reference to the given user.
    #[must_use]
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.full_name(),
        }
    }
}
