//! Evaluation harness.
//!
//! Benchmarks the genetic optimizer against the dispatching baselines
//! over many task sets and seeds, then compares them with paired
//! nonparametric statistics.
//!
//! # Pipeline
//!
//! 1. Per task set: GA × `runs`, random × `runs` (paired seeds),
//!    deterministic baselines × 1
//! 2. [`ScheduleMetrics`](crate::metrics::ScheduleMetrics) for every order
//! 3. Per algorithm: mean and standard deviation of each metric
//! 4. GA versus each baseline: improvement ratio, Wilcoxon p-value,
//!    Cliff's delta
//!
//! # Submodules
//!
//! - [`statistics`]: Wilcoxon signed-rank, Cliff's delta, improvement ratio

mod report;
mod runner;
pub mod statistics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use report::{
    AlgorithmSummary, Comparison, ComparisonReport, ConvergenceSummary, GA_NAME, MetricComparison,
    MetricSummary,
};
pub use runner::{RUN_SEED_STRIDE, evaluate, run_seed};

use crate::dispatching::Baseline;
use crate::scheduler::SchedulerConfig;
use crate::weights::AnalyticsSnapshot;

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// GA runs (and random baseline runs) per task set.
    pub runs: usize,
    /// Seed of run 0; run `r` uses `base_seed + 42·r`.
    pub base_seed: u64,
    /// Task sets with fewer pending tasks are skipped.
    pub min_tasks: usize,
    /// Baselines to compare against, in report order.
    pub baselines: Vec<Baseline>,
    /// Optimizer settings; the seed and reference time are set per run.
    pub scheduler: SchedulerConfig,
    /// Shared simulation start; `Utc::now()` at call entry when `None`.
    pub start_time: Option<DateTime<Utc>>,
    /// Behavioral signals the GA weights are adapted to.
    pub analytics: AnalyticsSnapshot,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            runs: 30,
            base_seed: 0,
            min_tasks: 3,
            baselines: Baseline::ALL.to_vec(),
            scheduler: SchedulerConfig::default(),
            start_time: None,
            analytics: AnalyticsSnapshot::default(),
        }
    }
}

impl EvaluationConfig {
    /// Sets the run count.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the seed of run 0.
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets the minimum pending task count.
    pub fn with_min_tasks(mut self, min_tasks: usize) -> Self {
        self.min_tasks = min_tasks;
        self
    }

    /// Restricts the baselines.
    pub fn with_baselines(mut self, baselines: impl IntoIterator<Item = Baseline>) -> Self {
        self.baselines = baselines.into_iter().collect();
        self
    }

    /// Sets the optimizer settings.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Pins the simulation start.
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the analytics snapshot used for the GA weights.
    pub fn with_analytics(mut self, analytics: AnalyticsSnapshot) -> Self {
        self.analytics = analytics;
        self
    }
}
