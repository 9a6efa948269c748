//! Work-order tracking for construction and maintenance crews.
//!
//! Tasks move through a role-gated status workflow; every mutation is
//! committed together with its audit comment under optimistic concurrency.
//! The notification side keeps at most one live message per task and
//! recipient, editing it in place where the transport allows and resending
//! where it does not, and a daily sweep reminds the responsible party
//! about approaching deadlines.
//!
//! The crate is organised hexagonally: `domain` holds the pure model,
//! `ports` the async trait seams, `adapters` the in-memory and Postgres
//! implementations, and `services` the orchestration on top. [`app`]
//! ties the two bounded contexts together.

pub mod app;
pub mod notify;
pub mod task;
