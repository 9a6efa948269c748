//! End-to-end tests for the application façade.
