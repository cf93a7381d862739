//! Comparison report types.
//!
//! Plain serde values, plus a [`Display`](std::fmt::Display) rendering
//! of the summary and significance tables for terminal output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::statistics::{EffectMagnitude, Significance, WilcoxonMethod};
use crate::metrics::Metric;

/// Report label of the genetic optimizer.
pub const GA_NAME: &str = "GA";

/// Mean and spread of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Sample mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Aggregated results of one algorithm over all evaluated task sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSummary {
    /// `"GA"` or a baseline name.
    pub name: String,
    /// Successful runs contributing samples.
    pub samples: usize,
    /// Runs that failed and were left out.
    pub skipped_runs: usize,
    /// Per-metric mean and standard deviation.
    pub metrics: BTreeMap<Metric, MetricSummary>,
}

impl AlgorithmSummary {
    /// Summary of one metric (zero when absent).
    pub fn metric(&self, metric: Metric) -> MetricSummary {
        self.metrics.get(&metric).copied().unwrap_or_default()
    }
}

/// GA versus one baseline on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// Metric compared.
    pub metric: Metric,
    /// GA mean.
    pub ga_mean: f64,
    /// Baseline mean.
    pub baseline_mean: f64,
    /// `(baseline − ga) / baseline × 100`.
    pub improvement_ratio: f64,
    /// Paired samples entering the tests.
    pub paired_samples: usize,
    /// Wilcoxon signed-rank two-sided p-value.
    pub p_value: f64,
    /// How the p-value was obtained.
    pub wilcoxon_method: WilcoxonMethod,
    /// Cliff's delta of (baseline, GA).
    pub cliffs_delta: f64,
    /// Bucketed `|δ|`.
    pub effect: EffectMagnitude,
    /// Significance marker of the p-value.
    pub significance: Significance,
}

impl MetricComparison {
    /// Whether GA's mean is better than the baseline's for this metric.
    pub fn ga_better(&self) -> bool {
        if self.metric.lower_is_better() {
            self.ga_mean < self.baseline_mean
        } else {
            self.ga_mean > self.baseline_mean
        }
    }
}

/// GA versus one baseline on every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Baseline name.
    pub baseline: String,
    /// One entry per metric, in report order.
    pub metrics: Vec<MetricComparison>,
}

impl Comparison {
    /// The entry for one metric.
    pub fn metric(&self, metric: Metric) -> Option<&MetricComparison> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Final GA fitness over all runs, plus the mean convergence curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSummary {
    /// GA runs contributing.
    pub runs: usize,
    /// Mean final fitness.
    pub mean: f64,
    /// Population standard deviation of final fitness.
    pub std_dev: f64,
    /// Lowest final fitness.
    pub min: f64,
    /// Highest final fitness.
    pub max: f64,
    /// Mean best-so-far fitness per generation.
    pub mean_curve: Vec<f64>,
}

/// Everything [`evaluate`](super::evaluate) produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Task sets supplied.
    pub task_sets: usize,
    /// Indices of task sets evaluated.
    pub evaluated_sets: Vec<usize>,
    /// Indices of task sets skipped for having too few pending tasks.
    pub skipped_sets: Vec<usize>,
    /// GA and stochastic baseline runs per task set.
    pub runs_per_set: usize,
    /// GA first, then baselines in configuration order.
    pub algorithms: Vec<AlgorithmSummary>,
    /// GA versus each baseline.
    pub comparisons: Vec<Comparison>,
    /// Present when at least one GA run succeeded.
    pub convergence: Option<ConvergenceSummary>,
}

impl ComparisonReport {
    /// Summary of one algorithm by name.
    pub fn algorithm(&self, name: &str) -> Option<&AlgorithmSummary> {
        self.algorithms.iter().find(|a| a.name == name)
    }

    /// Comparison against one baseline by name.
    pub fn comparison(&self, baseline: &str) -> Option<&Comparison> {
        self.comparisons.iter().find(|c| c.baseline == baseline)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Task sets: {} evaluated, {} skipped ({} runs per set)",
            self.evaluated_sets.len(),
            self.skipped_sets.len(),
            self.runs_per_set
        )?;

        writeln!(f)?;
        write!(f, "{:<10}", "Algorithm")?;
        for metric in Metric::ALL {
            write!(f, " {:>20}", metric.abbreviation())?;
        }
        writeln!(f, " {:>6} {:>6}", "N", "Skip")?;
        for algorithm in &self.algorithms {
            write!(f, "{:<10}", algorithm.name)?;
            for metric in Metric::ALL {
                let s = algorithm.metric(metric);
                write!(f, " {:>20}", format!("{:.3} ± {:.3}", s.mean, s.std_dev))?;
            }
            writeln!(f, " {:>6} {:>6}", algorithm.samples, algorithm.skipped_runs)?;
        }

        for comparison in &self.comparisons {
            writeln!(f)?;
            writeln!(f, "GA vs {}", comparison.baseline)?;
            writeln!(
                f,
                "  {:<6} {:>12} {:>12} {:>9} {:>10} {:>8} {:<10} {}",
                "Metric", "GA", "Baseline", "IR%", "p", "δ", "Effect", "Sig"
            )?;
            for m in &comparison.metrics {
                writeln!(
                    f,
                    "  {:<6} {:>12.3} {:>12.3} {:>9.1} {:>10.4} {:>8.3} {:<10} {}",
                    m.metric.abbreviation(),
                    m.ga_mean,
                    m.baseline_mean,
                    m.improvement_ratio,
                    m.p_value,
                    m.cliffs_delta,
                    m.effect.to_string(),
                    m.significance
                )?;
            }
        }

        if let Some(c) = &self.convergence {
            writeln!(f)?;
            writeln!(
                f,
                "Final fitness over {} runs: mean {:.4}, std {:.4}, min {:.4}, max {:.4}",
                c.runs, c.mean, c.std_dev, c.min, c.max
            )?;
        }
        Ok(())
    }
}
