//! Tests for the notification context.

mod dispatch_tests;
mod fixtures;
