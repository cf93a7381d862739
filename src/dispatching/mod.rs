//! Dispatching rules and baseline schedulers.
//!
//! Classical single-machine priority rules used as comparison baselines
//! for the genetic optimizer. None of them are used on the live
//! scheduling path.
//!
//! # Usage
//!
//! ```
//! use focus_schedule::dispatching::{Baseline, RuleEngine, rules};
//! use focus_schedule::models::TaskRecord;
//!
//! let tasks = vec![TaskRecord::new(1, 45), TaskRecord::new(2, 15)];
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Spt)
//!     .with_tie_breaker(rules::Fcfs);
//! assert_eq!(engine.sort(&tasks)[0].id, 2);
//!
//! assert_eq!(Baseline::Spt.schedule(&tasks, 0)[0].id, 2);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Smith (1956), "Various optimizers for single-stage production"
//! - Jackson (1955), "Scheduling a production line to minimize maximum tardiness"

mod baseline;
mod engine;
pub mod rules;

pub use baseline::{Baseline, random_order};
pub use engine::{RuleEngine, TieBreaker};

use crate::models::TaskRecord;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (scheduled first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates task priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules return smaller values for
/// tasks that should run first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "EDD").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a task. Lower = earlier.
    fn evaluate(&self, task: &TaskRecord) -> RuleScore;
}
