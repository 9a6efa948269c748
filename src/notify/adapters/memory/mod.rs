//! In-memory adapters for the notification ports.

mod messenger;
mod notifications;

pub use messenger::{OutboundMessage, RecordingMessenger};
pub use notifications::InMemoryNotificationRepository;
