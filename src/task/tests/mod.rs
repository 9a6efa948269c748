//! Tests for the work-order context.

mod fixtures;
mod service_tests;
