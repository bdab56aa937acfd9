//! The pipeline's concurrency substrate: a sticky condition-variable
//! [`Monitor`] and a [`BoundedQueue`] built on top of it.
//!
//! No spin loops, no timed waits, no sleeps — every suspension point here
//! blocks on a condition variable and is woken by an explicit signal from the
//! thread that changed the relevant predicate.

mod error;
mod invariants;
mod monitor;
mod queue;

pub use error::QueueError;
pub use monitor::Monitor;
pub use queue::BoundedQueue;
