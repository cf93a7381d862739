//! Benchmark driver.
//!
//! For each task set: run the GA `R` times, the random baseline `R`
//! times with the same seed sequence, every deterministic baseline once,
//! and score all orders from one shared start time. Sets run in
//! parallel; results are merged in input order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::EvaluationConfig;
use super::report::{
    AlgorithmSummary, Comparison, ComparisonReport, ConvergenceSummary, GA_NAME, MetricComparison,
    MetricSummary,
};
use super::statistics::{
    EffectMagnitude, Significance, cliffs_delta, improvement_ratio, mean, std_dev,
    wilcoxon_signed_rank,
};
use crate::dispatching::Baseline;
use crate::error::{Result, SchedulingError};
use crate::metrics::{Metric, ScheduleMetrics};
use crate::models::{TaskRecord, into_records};
use crate::scheduler::optimize;
use crate::validation::validate_evaluation_config;
use crate::weights::FitnessWeights;

/// Seed spacing between runs.
pub const RUN_SEED_STRIDE: u64 = 42;

/// Seed of run `run`.
pub fn run_seed(base_seed: u64, run: usize) -> u64 {
    base_seed.wrapping_add((run as u64).wrapping_mul(RUN_SEED_STRIDE))
}

/// Raw samples from one task set.
#[derive(Debug, Default)]
struct SetSamples {
    ga: Vec<ScheduleMetrics>,
    ga_fitness: Vec<f64>,
    ga_history: Vec<Vec<f64>>,
    ga_failures: usize,
    baselines: BTreeMap<Baseline, Vec<ScheduleMetrics>>,
}

enum SetOutcome {
    Skipped,
    Evaluated(SetSamples),
}

/// Benchmarks the GA against the configured baselines.
///
/// Only configuration problems are errors. Task sets with fewer than
/// `min_tasks` pending tasks are skipped; failing GA runs are counted
/// and left out of the samples.
///
/// # Example
/// ```
/// use focus_schedule::evaluation::{EvaluationConfig, evaluate};
/// use focus_schedule::ga::GaConfig;
/// use focus_schedule::models::TaskRecord;
/// use focus_schedule::scheduler::SchedulerConfig;
///
/// let set: Vec<TaskRecord> = (1..=4).map(|i| TaskRecord::new(i, 10 * i as u32)).collect();
/// let config = EvaluationConfig::default()
///     .with_runs(3)
///     .with_scheduler(SchedulerConfig::default().with_ga(
///         GaConfig::default().with_population_size(10).with_generations(5),
///     ));
/// let report = evaluate(&[set], &config).unwrap();
/// assert_eq!(report.algorithm("GA").unwrap().samples, 3);
/// ```
pub fn evaluate(
    task_sets: &[Vec<TaskRecord>],
    config: &EvaluationConfig,
) -> Result<ComparisonReport> {
    validate_evaluation_config(config).map_err(SchedulingError::InvalidConfig)?;

    let start_time = config.start_time.unwrap_or_else(Utc::now);
    let weights = FitnessWeights::adaptive(&config.scheduler.weights, &config.analytics);
    debug!(
        task_sets = task_sets.len(),
        runs = config.runs,
        baselines = config.baselines.len(),
        "starting evaluation"
    );

    let outcomes: Vec<SetOutcome> = task_sets
        .par_iter()
        .enumerate()
        .map(|(index, tasks)| evaluate_set(index, tasks, config, weights, start_time))
        .collect();

    let mut evaluated_sets = Vec::new();
    let mut skipped_sets = Vec::new();
    let mut merged = SetSamples::default();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            SetOutcome::Skipped => skipped_sets.push(index),
            SetOutcome::Evaluated(samples) => {
                evaluated_sets.push(index);
                merged.ga.extend(samples.ga);
                merged.ga_fitness.extend(samples.ga_fitness);
                merged.ga_history.extend(samples.ga_history);
                merged.ga_failures += samples.ga_failures;
                for (baseline, metrics) in samples.baselines {
                    merged.baselines.entry(baseline).or_default().extend(metrics);
                }
            }
        }
    }

    let mut algorithms = vec![summarize(GA_NAME, &merged.ga, merged.ga_failures)];
    let mut comparisons = Vec::with_capacity(config.baselines.len());
    for &baseline in &config.baselines {
        let samples = merged.baselines.get(&baseline).map(Vec::as_slice).unwrap_or(&[]);
        algorithms.push(summarize(baseline.name(), samples, 0));
        if !merged.ga.is_empty() && !samples.is_empty() {
            comparisons.push(compare(baseline, &merged.ga, samples));
        }
    }

    let convergence = convergence_summary(&merged.ga_fitness, &merged.ga_history);

    info!(
        evaluated = evaluated_sets.len(),
        skipped = skipped_sets.len(),
        ga_samples = merged.ga.len(),
        ga_failures = merged.ga_failures,
        "evaluation finished"
    );

    Ok(ComparisonReport {
        task_sets: task_sets.len(),
        evaluated_sets,
        skipped_sets,
        runs_per_set: config.runs,
        algorithms,
        comparisons,
        convergence,
    })
}

fn evaluate_set(
    index: usize,
    tasks: &[TaskRecord],
    config: &EvaluationConfig,
    weights: FitnessWeights,
    start_time: DateTime<Utc>,
) -> SetOutcome {
    let pending: Vec<TaskRecord> = tasks.iter().filter(|t| t.is_pending()).cloned().collect();
    if pending.len() < config.min_tasks {
        debug!(index, pending = pending.len(), "skipping task set");
        return SetOutcome::Skipped;
    }

    let mut samples = SetSamples::default();
    for run in 0..config.runs {
        let seed = run_seed(config.base_seed, run);
        let ga = config
            .scheduler
            .ga
            .clone()
            .with_seed(seed)
            .with_reference_time(start_time);
        match optimize(&pending, weights, &ga) {
            Ok(result) if result.fitness.is_finite() => {
                samples
                    .ga
                    .push(ScheduleMetrics::calculate(&into_records(result.ordered), start_time));
                samples.ga_fitness.push(result.fitness);
                samples.ga_history.push(result.history);
            }
            Ok(result) => {
                warn!(index, run, fitness = result.fitness, "GA run produced non-finite fitness");
                samples.ga_failures += 1;
            }
            Err(error) => {
                warn!(index, run, %error, "GA run failed");
                samples.ga_failures += 1;
            }
        }
    }

    for &baseline in &config.baselines {
        let repetitions = if baseline.is_deterministic() { 1 } else { config.runs };
        let metrics = (0..repetitions)
            .map(|run| {
                let order = baseline.schedule(&pending, run_seed(config.base_seed, run));
                ScheduleMetrics::calculate(&order, start_time)
            })
            .collect();
        samples.baselines.insert(baseline, metrics);
    }

    debug!(
        index,
        tasks = pending.len(),
        ga_samples = samples.ga.len(),
        "task set evaluated"
    );
    SetOutcome::Evaluated(samples)
}

fn summarize(name: &str, samples: &[ScheduleMetrics], skipped_runs: usize) -> AlgorithmSummary {
    let metrics = Metric::ALL
        .into_iter()
        .map(|metric| {
            let values = values_of(samples, metric);
            let summary = MetricSummary {
                mean: mean(&values),
                std_dev: std_dev(&values),
            };
            (metric, summary)
        })
        .collect();
    AlgorithmSummary {
        name: name.to_string(),
        samples: samples.len(),
        skipped_runs,
        metrics,
    }
}

fn compare(baseline: Baseline, ga: &[ScheduleMetrics], other: &[ScheduleMetrics]) -> Comparison {
    let paired = ga.len().min(other.len());
    let metrics = Metric::ALL
        .into_iter()
        .map(|metric| {
            let ga_values = values_of(ga, metric);
            let baseline_values = values_of(other, metric);
            let ga_mean = mean(&ga_values);
            let baseline_mean = mean(&baseline_values);

            let ga_paired = &ga_values[..paired];
            let baseline_paired = &baseline_values[..paired];
            let wilcoxon = wilcoxon_signed_rank(ga_paired, baseline_paired);
            let delta = cliffs_delta(baseline_paired, ga_paired);

            MetricComparison {
                metric,
                ga_mean,
                baseline_mean,
                improvement_ratio: improvement_ratio(baseline_mean, ga_mean),
                paired_samples: paired,
                p_value: wilcoxon.p_value,
                wilcoxon_method: wilcoxon.method,
                cliffs_delta: delta,
                effect: EffectMagnitude::from_delta(delta),
                significance: Significance::from_p_value(wilcoxon.p_value),
            }
        })
        .collect();
    Comparison {
        baseline: baseline.name().to_string(),
        metrics,
    }
}

fn convergence_summary(
    final_fitness: &[f64],
    histories: &[Vec<f64>],
) -> Option<ConvergenceSummary> {
    if final_fitness.is_empty() {
        return None;
    }
    let generations = histories.iter().map(Vec::len).max().unwrap_or(0);
    let mean_curve = (0..generations)
        .map(|g| {
            let at_g: Vec<f64> = histories.iter().filter_map(|h| h.get(g).copied()).collect();
            mean(&at_g)
        })
        .collect();
    Some(ConvergenceSummary {
        runs: final_fitness.len(),
        mean: mean(final_fitness),
        std_dev: std_dev(final_fitness),
        min: final_fitness.iter().copied().fold(f64::INFINITY, f64::min),
        max: final_fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean_curve,
    })
}

fn values_of(samples: &[ScheduleMetrics], metric: Metric) -> Vec<f64> {
    samples.iter().map(|m| m.get(metric)).collect()
}
