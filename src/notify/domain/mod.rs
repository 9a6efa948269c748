//! Domain model for notification dispatch.
//!
//! Pure types and rendering: delivery records with their explicit state
//! machine, the reminder schedule, and every Russian message text.

mod card;
mod record;
mod schedule;
mod text;

pub use card::task_card;
pub use record::{DeliveryPlan, DeliveryState, MessageId, NotificationId, NotificationRecord};
pub use schedule::{REMINDER_OFFSETS, days_until, reminder_dates};
pub use text::{
    ACKNOWLEDGE_NOTE, COMMENT_EVENT, REFRESH_EVENT, date_event, days_text, no_responsible_text,
    reminder_event, retire_failure_text, send_failure_text, status_event,
};
