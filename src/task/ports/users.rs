//! Lookup port resolving external chat identities to user records.

use crate::task::domain::{ChatId, User};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Resolves the transport-side identity of an incoming actor.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds the user registered for `chat`.
    ///
    /// Returns `None` for unknown identities; front ends turn that into a
    /// registration prompt.
    async fn find_by_chat(&self, chat: ChatId) -> UserDirectoryResult<Option<User>>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
