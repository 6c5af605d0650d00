//! Discrete-event plumbing shared by the podsim crates.
//!
//! Provides a time-ordered event queue which also acts as the simulation clock,
//! and logging helpers which prefix messages with the simulation time.

#![warn(missing_docs)]

pub mod event;
pub mod log;
pub mod queue;

pub use colored;
pub use event::{Event, EventId};
pub use queue::{EventQueue, EPSILON};
