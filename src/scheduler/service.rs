//! User-facing scheduling call.
//!
//! Turns analytics into adaptive weights, drops completed tasks, and runs
//! the genetic optimizer. A timed variant runs the search on a worker
//! thread and cancels it cooperatively when the budget runs out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::genetic::{SchedulerConfig, optimize_with_cancel};
use crate::error::{Result, SchedulingError};
use crate::models::{ScheduledTask, TaskRecord};
use crate::validation::validate_tasks;
use crate::weights::{AnalyticsProvider, FitnessWeights};

/// Result of a scheduling call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Pending tasks in suggested order, with suggested breaks.
    pub ordered_tasks: Vec<ScheduledTask>,
    /// Fitness of the order.
    pub fitness: f64,
    /// Weights the order was optimized for.
    pub weights: FitnessWeights,
    /// Generations evaluated.
    pub generations: usize,
}

/// Schedules a user's pending tasks.
///
/// # Example
/// ```
/// use focus_schedule::ga::GaConfig;
/// use focus_schedule::models::TaskRecord;
/// use focus_schedule::scheduler::{SchedulerConfig, TaskScheduler};
/// use focus_schedule::weights::AnalyticsSnapshot;
///
/// let config = SchedulerConfig::default()
///     .with_ga(GaConfig::default().with_population_size(20).with_generations(10).with_seed(7));
/// let scheduler = TaskScheduler::new(config);
///
/// let tasks = vec![
///     TaskRecord::new(1, 25),
///     TaskRecord::new(2, 50).with_completed(true),
///     TaskRecord::new(3, 15),
/// ];
/// let analytics = AnalyticsSnapshot::new(0.4, 2.0);
/// let outcome = scheduler.schedule(&tasks, Some(&analytics)).unwrap();
/// assert_eq!(outcome.ordered_tasks.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    config: SchedulerConfig,
}

impl TaskScheduler {
    /// Creates a scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Orders the pending tasks in `tasks`.
    ///
    /// `analytics` may be `None`; neutral weights are used then.
    pub fn schedule(
        &self,
        tasks: &[TaskRecord],
        analytics: Option<&dyn AnalyticsProvider>,
    ) -> Result<ScheduleOutcome> {
        let (pending, weights) = self.prepare(tasks, analytics)?;
        run(&pending, weights, &self.config, &AtomicBool::new(false))
    }

    /// [`schedule`](Self::schedule) with a wall-clock budget.
    ///
    /// On expiry the search is told to stop and
    /// [`SchedulingError::Timeout`] is returned; a late result is
    /// discarded.
    pub fn schedule_with_timeout(
        &self,
        tasks: &[TaskRecord],
        analytics: Option<&dyn AnalyticsProvider>,
        timeout: Duration,
    ) -> Result<ScheduleOutcome> {
        let (pending, weights) = self.prepare(tasks, analytics)?;
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        let config = self.config.clone();
        let worker_cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            let result = run(&pending, weights, &config, &worker_cancel);
            // The receiver is gone after a timeout.
            let _ = sender.send(result);
        });

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(?timeout, "scheduling timed out");
                Err(SchedulingError::Timeout(timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SchedulingError::WorkerLost),
        }
    }

    fn prepare(
        &self,
        tasks: &[TaskRecord],
        analytics: Option<&dyn AnalyticsProvider>,
    ) -> Result<(Vec<TaskRecord>, FitnessWeights)> {
        self.config.validate()?;
        let pending: Vec<TaskRecord> = tasks.iter().filter(|t| t.is_pending()).cloned().collect();
        validate_tasks(&pending).map_err(SchedulingError::InvalidInput)?;
        let weights = FitnessWeights::from_provider(&self.config.weights, analytics);
        debug!(
            total = tasks.len(),
            pending = pending.len(),
            "prepared scheduling input"
        );
        Ok((pending, weights))
    }
}

fn run(
    pending: &[TaskRecord],
    weights: FitnessWeights,
    config: &SchedulerConfig,
    cancel: &AtomicBool,
) -> Result<ScheduleOutcome> {
    let optimized = optimize_with_cancel(pending, weights, &config.ga, cancel)?;
    Ok(ScheduleOutcome {
        ordered_tasks: optimized.ordered,
        fitness: optimized.fitness,
        weights,
        generations: optimized.generations,
    })
}

/// One-shot [`TaskScheduler::schedule`].
pub fn schedule(
    tasks: &[TaskRecord],
    analytics: Option<&dyn AnalyticsProvider>,
    config: &SchedulerConfig,
) -> Result<ScheduleOutcome> {
    TaskScheduler::new(config.clone()).schedule(tasks, analytics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GaConfig;
    use crate::models::schedule_ids;
    use crate::weights::AnalyticsSnapshot;

    fn scheduler(population: usize, generations: usize) -> TaskScheduler {
        TaskScheduler::new(SchedulerConfig::default().with_ga(
            GaConfig::default()
                .with_population_size(population)
                .with_generations(generations)
                .with_seed(42),
        ))
    }

    #[test]
    fn test_completed_tasks_are_dropped() {
        let tasks = vec![
            TaskRecord::new(1, 20),
            TaskRecord::new(2, 20).with_completed(true),
            TaskRecord::new(3, 20),
        ];
        let outcome = scheduler(10, 5).schedule(&tasks, None).unwrap();
        let mut ids = schedule_ids(&outcome.ordered_tasks);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_all_completed_gives_empty_outcome() {
        let tasks = vec![TaskRecord::new(1, 20).with_completed(true)];
        let outcome = scheduler(10, 5).schedule(&tasks, None).unwrap();
        assert!(outcome.ordered_tasks.is_empty());
        assert_eq!(outcome.fitness, 0.0);
    }

    #[test]
    fn test_completed_duplicates_are_ignored() {
        let tasks = vec![TaskRecord::new(1, 20), TaskRecord::new(1, 20).with_completed(true)];
        assert!(scheduler(10, 5).schedule(&tasks, None).is_ok());
    }

    #[test]
    fn test_weights_follow_analytics() {
        let tasks = vec![TaskRecord::new(1, 20), TaskRecord::new(2, 40)];
        let analytics = AnalyticsSnapshot::new(0.2, 1.0);
        let outcome = scheduler(10, 5).schedule(&tasks, Some(&analytics)).unwrap();
        assert!((outcome.weights.momentum - 0.8).abs() < 1e-12);
        assert!((outcome.weights.variety - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_free_function_matches_method() {
        let tasks: Vec<TaskRecord> = (1..=5)
            .map(|i| TaskRecord::new(i, 5 * i as u32).with_session(i, 0))
            .collect();
        let s = scheduler(12, 8);
        let by_method = s.schedule(&tasks, None).unwrap();
        let by_fn = schedule(&tasks, None, s.config()).unwrap();
        assert_eq!(by_method.ordered_tasks, by_fn.ordered_tasks);
    }

    #[test]
    fn test_timeout_returns_result_when_fast() {
        let tasks = vec![TaskRecord::new(1, 20), TaskRecord::new(2, 40)];
        let outcome = scheduler(10, 3)
            .schedule_with_timeout(&tasks, None, Duration::from_secs(30))
            .unwrap();
        assert_eq!(outcome.ordered_tasks.len(), 2);
    }

    #[test]
    fn test_invalid_config_reported_before_worker() {
        let s = TaskScheduler::new(
            SchedulerConfig::default().with_ga(GaConfig::default().with_generations(0)),
        );
        let err = s
            .schedule_with_timeout(&[TaskRecord::new(1, 5)], None, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidConfig(_)));
    }
}
