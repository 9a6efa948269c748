//! Application layer for the work-order system.

mod service;

pub use service::{WorkOrderError, WorkOrderResult, WorkOrderService};

#[cfg(test)]
mod tests;
