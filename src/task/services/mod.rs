//! Application services for the task context.

mod operations;

pub use operations::{TaskOperationError, TaskOperationResult, TaskOperations};
