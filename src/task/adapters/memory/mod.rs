//! In-memory adapters for task persistence and user lookup.

mod task;
mod users;

pub use task::InMemoryTaskRepository;
pub use users::InMemoryUserDirectory;
