//! Notification bounded context.
//!
//! Tracks the live task-card message each involved user holds, edits or
//! replaces it as the task evolves, and sweeps approaching deadlines into
//! reminders. At most one active message exists per (task, recipient)
//! after every dispatch cycle.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
