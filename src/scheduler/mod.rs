//! Fixed-interval loop around the reconciler.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerCreationError, SchedulerError};
