//! Schedule quality metrics.
//!
//! Simulates sequential execution of an ordered task list on a single
//! resource and derives standard single-machine performance measures.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Weighted Tardiness | Σ wⱼ·max(0, Cⱼ − dⱼ) |
//! | Total Completion Time | Σ Cⱼ |
//! | On-Time Rate | (n − tardy) / n |
//! | Momentum Index | Σ (n − k) / max(1, pₖ), divided by n |
//! | Makespan (C_max) | Final elapsed time |
//! | Maximum Lateness (L_max) | max(Cⱼ − dⱼ) over dated tasks |
//! | Weighted Completion Time | Σ wⱼ·Cⱼ |
//! | Cognitive Switch Cost | Σ |cₖ − cₖ₋₁| |
//!
//! Completion times are minutes elapsed since the start time.
//! Weights are `w = cognitive_load²` over the load clamped into 1–5.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ScheduledTask, TaskRecord};

/// Schedule performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Σ weight · tardiness.
    pub total_weighted_tardiness: f64,
    /// Σ completion time.
    pub total_completion_time: f64,
    /// Fraction of tasks finishing by their due date (1.0 if none are due).
    pub on_time_rate: f64,
    /// Position-weighted inverse duration, normalized by task count.
    pub momentum_index: f64,
    /// Final elapsed time.
    pub makespan: f64,
    /// Largest lateness over dated tasks (may be negative; 0 if none).
    pub max_lateness: f64,
    /// Σ weight · completion time.
    pub weighted_completion_time: f64,
    /// Σ |load change| between neighbours.
    pub cognitive_switch_cost: f64,
    /// Number of tasks finishing after their due date.
    pub tardy_count: usize,
    /// Number of scheduled tasks.
    pub task_count: usize,
}

impl Default for ScheduleMetrics {
    fn default() -> Self {
        Self {
            total_weighted_tardiness: 0.0,
            total_completion_time: 0.0,
            on_time_rate: 1.0,
            momentum_index: 0.0,
            makespan: 0.0,
            max_lateness: 0.0,
            weighted_completion_time: 0.0,
            cognitive_switch_cost: 0.0,
            tardy_count: 0,
            task_count: 0,
        }
    }
}

impl ScheduleMetrics {
    /// Computes metrics for tasks executed back to back from `start_time`.
    pub fn calculate(schedule: &[TaskRecord], start_time: DateTime<Utc>) -> Self {
        Self::simulate(schedule.iter().map(|t| (t, 0)), schedule.len(), start_time)
    }

    /// Computes metrics with each task's suggested break inserted after it.
    ///
    /// Makespan then equals Σ duration + Σ break.
    pub fn calculate_with_breaks(schedule: &[ScheduledTask], start_time: DateTime<Utc>) -> Self {
        Self::simulate(
            schedule
                .iter()
                .map(|s| (&s.task, s.suggested_break_minutes)),
            schedule.len(),
            start_time,
        )
    }

    fn simulate<'a>(
        schedule: impl Iterator<Item = (&'a TaskRecord, u32)>,
        n: usize,
        start_time: DateTime<Utc>,
    ) -> Self {
        if n == 0 {
            return Self::default();
        }

        let mut elapsed_minutes: i64 = 0;
        let mut twt = 0.0;
        let mut tct = 0.0;
        let mut wct = 0.0;
        let mut momentum = 0.0;
        let mut switch_cost = 0.0;
        let mut tardy_count = 0;
        let mut max_lateness: Option<f64> = None;
        let mut prev_load: Option<u8> = None;

        for (k, (task, break_minutes)) in schedule.enumerate() {
            elapsed_minutes += i64::from(task.estimated_duration_minutes);
            let completion = elapsed_minutes as f64;
            let weight = task.weight();

            if let Some(due) = task.due_date {
                let lateness = completion - minutes_between(start_time, due);
                let tardiness = lateness.max(0.0);
                if lateness > 0.0 {
                    tardy_count += 1;
                }
                twt += weight * tardiness;
                max_lateness = Some(max_lateness.map_or(lateness, |m| m.max(lateness)));
            }

            tct += completion;
            wct += weight * completion;
            momentum += (n - k) as f64 / f64::from(task.effective_duration());

            if let Some(prev) = prev_load {
                switch_cost += f64::from(task.clamped_load().abs_diff(prev));
            }
            prev_load = Some(task.clamped_load());

            // The break follows completion; it delays later tasks only.
            elapsed_minutes += i64::from(break_minutes);
        }

        Self {
            total_weighted_tardiness: twt,
            total_completion_time: tct,
            on_time_rate: (n - tardy_count) as f64 / n as f64,
            momentum_index: momentum / n as f64,
            makespan: elapsed_minutes as f64,
            max_lateness: max_lateness.unwrap_or(0.0),
            weighted_completion_time: wct,
            cognitive_switch_cost: switch_cost,
            tardy_count,
            task_count: n,
        }
    }

    /// Reads one metric by name.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalWeightedTardiness => self.total_weighted_tardiness,
            Metric::TotalCompletionTime => self.total_completion_time,
            Metric::OnTimeRate => self.on_time_rate,
            Metric::MomentumIndex => self.momentum_index,
            Metric::Makespan => self.makespan,
            Metric::MaxLateness => self.max_lateness,
            Metric::WeightedCompletionTime => self.weighted_completion_time,
            Metric::CognitiveSwitchCost => self.cognitive_switch_cost,
        }
    }
}

/// Signed minutes from `from` to `to`.
pub(crate) fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// A scalar of [`ScheduleMetrics`] the evaluation harness compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Σ wⱼTⱼ.
    TotalWeightedTardiness,
    /// Σ Cⱼ.
    TotalCompletionTime,
    /// Fraction on time.
    OnTimeRate,
    /// Momentum index.
    MomentumIndex,
    /// C_max.
    Makespan,
    /// L_max.
    MaxLateness,
    /// Σ wⱼCⱼ.
    WeightedCompletionTime,
    /// Σ |Δ load|.
    CognitiveSwitchCost,
}

impl Metric {
    /// All metrics, in report order.
    pub const ALL: [Metric; 8] = [
        Metric::TotalWeightedTardiness,
        Metric::TotalCompletionTime,
        Metric::OnTimeRate,
        Metric::MomentumIndex,
        Metric::Makespan,
        Metric::MaxLateness,
        Metric::WeightedCompletionTime,
        Metric::CognitiveSwitchCost,
    ];

    /// Short label ("TWT", "OTR", ...).
    pub fn abbreviation(self) -> &'static str {
        match self {
            Metric::TotalWeightedTardiness => "TWT",
            Metric::TotalCompletionTime => "TCT",
            Metric::OnTimeRate => "OTR",
            Metric::MomentumIndex => "MI",
            Metric::Makespan => "CMAX",
            Metric::MaxLateness => "LMAX",
            Metric::WeightedCompletionTime => "WCT",
            Metric::CognitiveSwitchCost => "CSC",
        }
    }

    /// Whether smaller values indicate a better schedule.
    pub fn lower_is_better(self) -> bool {
        !matches!(self, Metric::OnTimeRate | Metric::MomentumIndex)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.abbreviation().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    fn due_in(minutes: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(minutes)
    }

    #[test]
    fn test_metrics_basic() {
        let schedule = vec![TaskRecord::new(1, 10), TaskRecord::new(2, 20)];
        let m = ScheduleMetrics::calculate(&schedule, t0());
        assert_eq!(m.task_count, 2);
        assert!((m.makespan - 30.0).abs() < 1e-10);
        // C = 10, 30
        assert!((m.total_completion_time - 40.0).abs() < 1e-10);
        assert!((m.weighted_completion_time - 40.0).abs() < 1e-10);
        // (2/10 + 1/20) / 2
        assert!((m.momentum_index - 0.125).abs() < 1e-10);
        assert_eq!(m.total_weighted_tardiness, 0.0);
        assert!((m.on_time_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_metrics_tardiness() {
        let schedule = vec![
            TaskRecord::new(1, 30).with_cognitive_load(2).with_due_date(due_in(20)), // 10 late
            TaskRecord::new(2, 30).with_due_date(due_in(120)),                       // 60 early
        ];
        let m = ScheduleMetrics::calculate(&schedule, t0());
        assert!((m.total_weighted_tardiness - 40.0).abs() < 1e-10); // 4 * 10
        assert_eq!(m.tardy_count, 1);
        assert!((m.on_time_rate - 0.5).abs() < 1e-10);
        assert!((m.max_lateness - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_max_lateness_negative_when_all_early() {
        let schedule = vec![TaskRecord::new(1, 10).with_due_date(due_in(60))];
        let m = ScheduleMetrics::calculate(&schedule, t0());
        assert!((m.max_lateness + 50.0).abs() < 1e-10);
        assert_eq!(m.tardy_count, 0);
    }

    #[test]
    fn test_metrics_empty() {
        let m = ScheduleMetrics::calculate(&[], t0());
        assert_eq!(m.task_count, 0);
        assert_eq!(m.makespan, 0.0);
        assert!((m.on_time_rate - 1.0).abs() < 1e-10);
        assert_eq!(m.max_lateness, 0.0);
    }

    #[test]
    fn test_switch_cost() {
        let schedule = vec![
            TaskRecord::new(1, 10).with_cognitive_load(1),
            TaskRecord::new(2, 10).with_cognitive_load(4),
            TaskRecord::new(3, 10).with_cognitive_load(2),
        ];
        let m = ScheduleMetrics::calculate(&schedule, t0());
        assert!((m.cognitive_switch_cost - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_range_loads_are_clamped() {
        let schedule = vec![
            TaskRecord::new(1, 10).with_cognitive_load(0).with_due_date(t0()),
            TaskRecord::new(2, 10).with_cognitive_load(9).with_due_date(t0()),
        ];
        let m = ScheduleMetrics::calculate(&schedule, t0());
        // 1 * 10 + 25 * 20
        assert!((m.total_weighted_tardiness - 510.0).abs() < 1e-10);
        assert!((m.cognitive_switch_cost - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_very_long_schedule_does_not_overflow() {
        let schedule: Vec<TaskRecord> = (0..300)
            .map(|i| TaskRecord::new(i, u32::MAX).with_due_date(due_in(60)))
            .collect();
        let m = ScheduleMetrics::calculate(&schedule, t0());
        assert_eq!(m.tardy_count, 300);
        assert!(m.total_weighted_tardiness.is_finite());
        assert!((m.makespan - 300.0 * f64::from(u32::MAX)).abs() < 1.0);
        assert!((m.max_lateness - (300.0 * f64::from(u32::MAX) - 60.0)).abs() < 1.0);
    }

    #[test]
    fn test_breaks_extend_makespan() {
        let schedule = vec![
            ScheduledTask::with_break(TaskRecord::new(1, 25), 5),
            ScheduledTask::with_break(TaskRecord::new(2, 25).with_due_date(due_in(50)), 6),
        ];
        let m = ScheduleMetrics::calculate_with_breaks(&schedule, t0());
        assert!((m.makespan - 61.0).abs() < 1e-10);
        // Second task finishes at 25 + 5 + 25 = 55 → 5 late.
        assert!((m.total_weighted_tardiness - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_metric_lookup_and_parse() {
        let m = ScheduleMetrics::calculate(&[TaskRecord::new(1, 15)], t0());
        assert_eq!(m.get(Metric::Makespan), 15.0);
        assert_eq!("twt".parse::<Metric>().unwrap(), Metric::TotalWeightedTardiness);
        assert!("nope".parse::<Metric>().is_err());
        assert!(!Metric::OnTimeRate.lower_is_better());
        assert!(Metric::TotalWeightedTardiness.lower_is_better());
    }
}
