//! In-memory user directory for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ChatId, User},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<ChatId, User>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user under their chat identity.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the backing lock is poisoned.
    pub fn register(&self, user: User) -> UserDirectoryResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|err| UserDirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        users.insert(user.chat(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_chat(&self, chat: ChatId) -> UserDirectoryResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|err| UserDirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(users.get(&chat).cloned())
    }
}
