//! Port contracts for notification dispatch.

mod messenger;
mod repository;

pub use messenger::{Messenger, TransportError};
pub use repository::{
    NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult,
};
