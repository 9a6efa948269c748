//! Messenger port for delivering notification messages.

use crate::notify::domain::MessageId;
use crate::task::domain::ChatId;
use async_trait::async_trait;
use thiserror::Error;

/// Outbound message transport.
///
/// Implementations map their platform's failure modes onto
/// [`TransportError`]; the dispatcher's behaviour depends on that
/// classification.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delivers a new message and returns its transport-side identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when delivery fails.
    async fn send(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError>;

    /// Rewrites an already delivered message in place.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotModified`] when the content is
    /// unchanged, [`TransportError::Gone`] when the message no longer
    /// exists, or [`TransportError::Failed`] otherwise.
    async fn edit(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Removes a delivered message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Gone`] when the message is already
    /// removed, or [`TransportError::Failed`] otherwise.
    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError>;
}

/// Classified transport failures.
///
/// None of these are fatal to a business transaction; the dispatcher
/// records them and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The edit would not change the message; treated as success.
    #[error("message is not modified")]
    NotModified,

    /// The message no longer exists at the transport.
    #[error("message is gone")]
    Gone,

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Failed(String),
}
