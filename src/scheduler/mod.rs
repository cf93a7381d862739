//! Task scheduling entry points.
//!
//! # Layers
//!
//! | Call | Input | Does |
//! |------|-------|------|
//! | [`optimize`] | pending tasks, weights | validation + genetic search |
//! | [`TaskScheduler::schedule`] | raw tasks, analytics | filter, adapt weights, optimize |
//! | [`TaskScheduler::schedule_with_timeout`] | same + budget | worker thread, cancels |
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

mod genetic;
mod service;

pub use genetic::{Optimized, SchedulerConfig, optimize, optimize_with_cancel};
pub use service::{ScheduleOutcome, TaskScheduler, schedule};
