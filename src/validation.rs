//! Input and configuration validation.
//!
//! Runs eagerly at call entry, before any search starts. Detects:
//! - Duplicate task IDs
//! - Zero-length tasks
//! - GA parameters that cannot drive a search (population < 2, no
//!   generations, tournament size 0, elitism that fills the population)
//! - Probabilities outside `[0, 1]`
//! - Negative or non-finite weight constants
//! - Harness configurations with no runs
//!
//! All problems are collected, not just the first one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::EvaluationConfig;
use crate::ga::GaConfig;
use crate::models::TaskRecord;
use crate::weights::WeightConstants;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// A task has zero estimated duration.
    ZeroDuration,
    /// Population smaller than two individuals.
    PopulationTooSmall,
    /// Generation count of zero.
    NoGenerations,
    /// Tournament size of zero.
    InvalidTournamentSize,
    /// Elitism count leaves no room for offspring.
    ElitismTooLarge,
    /// A probability outside `[0, 1]` or not finite.
    ProbabilityOutOfRange,
    /// A weight constant that is negative or not finite.
    InvalidWeightConstant,
    /// Harness configured with zero runs.
    NoRuns,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates the task list handed to the optimizer.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. Every task has a positive duration
pub fn validate_tasks(tasks: &[TaskRecord]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::with_capacity(tasks.len());

    for task in tasks {
        if !seen.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if task.estimated_duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Task {} has zero estimated duration", task.id),
            ));
        }
    }

    finish(errors)
}

/// Validates genetic search parameters.
pub fn validate_ga_config(config: &GaConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.population_size < 2 {
        errors.push(ValidationError::new(
            ValidationErrorKind::PopulationTooSmall,
            format!(
                "Population size must be at least 2, got {}",
                config.population_size
            ),
        ));
    }
    if config.generations < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoGenerations,
            "Generation count must be at least 1",
        ));
    }
    if config.tournament_size < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTournamentSize,
            "Tournament size must be at least 1",
        ));
    }
    if config.elitism_count >= config.population_size.max(1) {
        errors.push(ValidationError::new(
            ValidationErrorKind::ElitismTooLarge,
            format!(
                "Elitism count {} must be smaller than population size {}",
                config.elitism_count, config.population_size
            ),
        ));
    }
    check_probability(&mut errors, "mutation", config.mutation_probability);
    check_probability(&mut errors, "crossover", config.crossover_probability);

    finish(errors)
}

/// Validates adaptive weight constants.
pub fn validate_weight_constants(constants: &WeightConstants) -> ValidationResult {
    let mut errors = Vec::new();
    for (name, value) in [
        ("base_urgency_weight", constants.base_urgency_weight),
        ("momentum_gain", constants.momentum_gain),
        ("variety_gain", constants.variety_gain),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeightConstant,
                format!("Weight constant {name} must be finite and non-negative, got {value}"),
            ));
        }
    }
    finish(errors)
}

/// Validates a harness configuration, including its embedded GA settings.
pub fn validate_evaluation_config(config: &EvaluationConfig) -> ValidationResult {
    let mut errors = Vec::new();
    if config.runs < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoRuns,
            "Evaluation run count must be at least 1",
        ));
    }
    if let Err(mut ga_errors) = validate_ga_config(&config.scheduler.ga) {
        errors.append(&mut ga_errors);
    }
    if let Err(mut weight_errors) = validate_weight_constants(&config.scheduler.weights) {
        errors.append(&mut weight_errors);
    }
    finish(errors)
}

fn check_probability(errors: &mut Vec<ValidationError>, name: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::new(
            ValidationErrorKind::ProbabilityOutOfRange,
            format!("{name} probability must be within [0, 1], got {value}"),
        ));
    }
}
