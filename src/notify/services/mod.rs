//! Dispatch and reminder services for notifications.

mod dispatch;
mod reminder;

pub use dispatch::{DispatchError, DispatchResult, Dispatcher};
pub use reminder::ReminderService;
