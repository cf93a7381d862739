//! GA-based task ordering.
//!
//! A random-key genetic search over one user's pending tasks. Each
//! chromosome carries a priority key and a break multiplier per task;
//! decoding interleaves session queues by priority and derives a
//! suggested break for every task.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover, mutation, and selection
//!
//! # Reference
//! - Bean (1994), "Genetic Algorithms and Random Keys for Sequencing and
//!   Optimization"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

mod chromosome;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::{GeneLayout, ScheduleChromosome, break_multiplier_bounds};
pub use problem::{
    BreakPolicy, DEFAULT_BREAK_MINUTES, DecodeError, FitnessBreakdown, TaskOrderingProblem,
    canonical_order, momentum_score, urgency_score, variety_score,
};
pub use runner::{GaConfig, GaOutcome, GaProblem, GaRunner, Individual};
