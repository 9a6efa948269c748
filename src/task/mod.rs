//! Work-order bounded context.
//!
//! Holds the task aggregate with its role-gated status workflow, the
//! persistence ports, in-memory and `PostgreSQL` adapters, and the
//! transactional operation services.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
