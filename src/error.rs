//! Error types for focus-schedule.
//!
//! Only configuration problems, invalid task input, and timeouts surface
//! as errors. Degenerate inputs and malformed chromosomes are handled
//! inside the engine and never reach the caller.

use std::time::Duration;

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Errors returned by the scheduling and evaluation entry points.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Rejected engine or harness configuration.
    #[error("invalid configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// Rejected task input (duplicate IDs, zero durations).
    #[error("invalid task input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// The call exceeded its time budget; any late result is discarded.
    #[error("scheduling timed out after {0:?}")]
    Timeout(Duration),

    /// The worker thread ended without sending a result.
    #[error("scheduling worker exited without a result")]
    WorkerLost,
}

impl SchedulingError {
    /// Validation details, if this is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::InvalidConfig(errors) | Self::InvalidInput(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
