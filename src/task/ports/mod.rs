//! Port contracts for task persistence and user lookup.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;
pub mod users;

pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use users::{UserDirectory, UserDirectoryError, UserDirectoryResult};
