//! Personal task-ordering optimization.
//!
//! Orders one user's pending tasks with a random-key genetic search whose
//! objective weights adapt to the user's behavioral history, suggests a
//! break after every task, and benchmarks the result against classical
//! single-machine dispatching rules.
//!
//! # Modules
//!
//! - **`models`**: `TaskRecord`, `ScheduledTask`
//! - **`weights`**: Adaptive fitness weights from completion rate and focus
//! - **`ga`**: Chromosome encoding, operators, decoding + fitness, search loop
//! - **`scheduler`**: `TaskScheduler` entry point, timeout wrapper
//! - **`dispatching`**: Baseline rules (FCFS, SPT, LPT, EDD, WSPT, CLS) and
//!   the seeded random baseline
//! - **`metrics`**: Single-machine schedule quality measures
//! - **`evaluation`**: Benchmark harness with Wilcoxon and Cliff's delta
//! - **`validation`**: Input and configuration checks
//!
//! # Example
//!
//! ```
//! use focus_schedule::ga::GaConfig;
//! use focus_schedule::models::TaskRecord;
//! use focus_schedule::scheduler::{SchedulerConfig, schedule};
//!
//! let tasks = vec![
//!     TaskRecord::new(1, 50).with_cognitive_load(4),
//!     TaskRecord::new(2, 15).with_session(7, 0),
//!     TaskRecord::new(3, 25).with_session(7, 1),
//! ];
//! let config = SchedulerConfig::default()
//!     .with_ga(GaConfig::default().with_population_size(20).with_generations(15).with_seed(1));
//! let outcome = schedule(&tasks, None, &config).unwrap();
//! assert_eq!(outcome.ordered_tasks.len(), 3);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Bean (1994), "Genetic Algorithms and Random Keys for Sequencing and
//!   Optimization"

pub mod dispatching;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod weights;

pub use error::{Result, SchedulingError};
