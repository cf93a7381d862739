//! Genetic optimization entry point.
//!
//! Validates input, pins the reference instant, builds the
//! [`TaskOrderingProblem`], and runs the search.

use std::sync::atomic::AtomicBool;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SchedulingError};
use crate::ga::{FitnessBreakdown, GaConfig, GaRunner, TaskOrderingProblem};
use crate::models::{ScheduledTask, TaskRecord};
use crate::validation::{validate_ga_config, validate_tasks, validate_weight_constants};
use crate::weights::{FitnessWeights, WeightConstants};

/// Full scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Genetic search and break settings.
    pub ga: GaConfig,
    /// Adaptive weight constants.
    pub weights: WeightConstants,
}

impl SchedulerConfig {
    /// Sets the genetic search settings.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the weight constants.
    pub fn with_weights(mut self, weights: WeightConstants) -> Self {
        self.weights = weights;
        self
    }

    /// Checks every part of the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Err(mut e) = validate_ga_config(&self.ga) {
            errors.append(&mut e);
        }
        if let Err(mut e) = validate_weight_constants(&self.weights) {
            errors.append(&mut e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchedulingError::InvalidConfig(errors))
        }
    }
}

/// Result of one optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimized {
    /// Tasks in suggested order, each with its suggested break.
    pub ordered: Vec<ScheduledTask>,
    /// Fitness of the returned order.
    pub fitness: f64,
    /// Fitness components of the returned order.
    pub breakdown: FitnessBreakdown,
    /// Generations evaluated.
    pub generations: usize,
    /// Best-so-far fitness per generation.
    pub history: Vec<f64>,
    /// Master seed used.
    pub seed: Option<u64>,
    /// Whether the search was stopped early.
    pub cancelled: bool,
}

impl Optimized {
    fn empty(seed: Option<u64>) -> Self {
        Self {
            ordered: Vec::new(),
            fitness: 0.0,
            breakdown: FitnessBreakdown::default(),
            generations: 0,
            history: Vec::new(),
            seed,
            cancelled: false,
        }
    }
}

/// Orders `tasks` with the genetic search.
///
/// Every task in `tasks` is scheduled exactly once; callers filter
/// completed tasks first. Empty input returns an empty schedule without
/// touching the configuration.
///
/// # Errors
/// - [`SchedulingError::InvalidConfig`] for unusable GA settings
/// - [`SchedulingError::InvalidInput`] for duplicate IDs or zero durations
pub fn optimize(
    tasks: &[TaskRecord],
    weights: FitnessWeights,
    config: &GaConfig,
) -> Result<Optimized> {
    optimize_with_cancel(tasks, weights, config, &AtomicBool::new(false))
}

/// [`optimize`] that stops between generations once `cancel` is set.
pub fn optimize_with_cancel(
    tasks: &[TaskRecord],
    weights: FitnessWeights,
    config: &GaConfig,
    cancel: &AtomicBool,
) -> Result<Optimized> {
    if tasks.is_empty() {
        return Ok(Optimized::empty(config.seed));
    }
    validate_ga_config(config).map_err(SchedulingError::InvalidConfig)?;
    validate_tasks(tasks).map_err(SchedulingError::InvalidInput)?;

    let reference_time = config.reference_time.unwrap_or_else(Utc::now);
    let policy = config.break_policy();
    let problem = TaskOrderingProblem::new(tasks, weights, reference_time)
        .with_break_policy(policy.clone())
        .with_operators(config.operators());
    debug!(
        tasks = tasks.len(),
        sessions = problem.session_count(),
        urgency = weights.urgency,
        momentum = weights.momentum,
        variety = weights.variety,
        "optimizing task order"
    );

    let outcome = GaRunner::run_with_cancel(&problem, config, cancel);
    let ordered = problem.decode(&outcome.best.genes).unwrap_or_else(|error| {
        warn!(%error, "best chromosome failed to decode; falling back to canonical order");
        problem
            .tasks()
            .iter()
            .map(|t| ScheduledTask::with_break(t.clone(), policy.base_break(t.session_id)))
            .collect()
    });
    let breakdown = problem.score_schedule(&ordered);

    Ok(Optimized {
        ordered,
        fitness: breakdown.total,
        breakdown,
        generations: outcome.generations,
        history: outcome.history,
        seed: Some(outcome.seed),
        cancelled: outcome.cancelled,
    })
}
