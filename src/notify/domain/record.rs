//! Notification delivery records and the per-recipient delivery state.

use crate::task::domain::{ChatId, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport-side identifier of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    /// Creates a message identifier from the transport-side value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One delivered notification message tracked for later edit or retirement.
///
/// The dispatch cycle maintains the invariant that at most one record per
/// (task, recipient) stays active once the cycle completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Record identifier.
    pub id: NotificationId,
    /// Task the message describes.
    pub task_id: TaskId,
    /// Recipient of the message.
    pub user_id: UserId,
    /// Chat the message was delivered to.
    pub chat: ChatId,
    /// Transport-side message identifier.
    pub message_id: MessageId,
    /// Whether the message is still the live card for this recipient.
    pub active: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Creates an active record for a freshly delivered message.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        chat: ChatId,
        message_id: MessageId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            task_id,
            user_id,
            chat,
            message_id,
            active: true,
            created_at: clock.utc(),
        }
    }
}

/// Delivery state of one (task, recipient) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// No live message exists for the recipient.
    Idle,
    /// A live message exists and may be editable in place.
    Active(MessageId),
}

/// What the dispatcher should do with the next notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Rewrite the existing live message.
    EditInPlace(MessageId),
    /// Retire live messages and deliver a fresh one.
    Resend,
}

impl DeliveryState {
    /// Derives the state from the recipient's newest active record.
    #[must_use]
    pub fn of(record: Option<&NotificationRecord>) -> Self {
        record.map_or(Self::Idle, |live| Self::Active(live.message_id))
    }

    /// Chooses the delivery plan for the next notification.
    ///
    /// Editing is only planned when the event allows it and a live message
    /// exists; everything else falls back to retire-then-send.
    #[must_use]
    pub fn plan(self, may_edit: bool) -> DeliveryPlan {
        match self {
            Self::Active(message) if may_edit => DeliveryPlan::EditInPlace(message),
            Self::Active(_) | Self::Idle => DeliveryPlan::Resend,
        }
    }
}
