//! Task-ordering GA problem definition.
//!
//! Implements [`GaProblem`] for the single-user task ordering problem.
//! Bridges [`TaskRecord`]s to the generic search in [`super::runner`].
//!
//! # Decoding
//!
//! Tasks are grouped into session queues (tasks without a session form one
//! implicit queue). Each step appends the queue head with the highest
//! priority gene, so tasks inside a session are never reordered. Ties fall
//! back to earlier due date (dated first), then shorter duration, then
//! lower ID.
//!
//! # Fitness
//!
//! `f = w_u·urgency + w_m·momentum + w_v·variety`, maximized.
//!
//! | Component | Formula |
//! |-----------|---------|
//! | urgency | `1 / (1 + Σ max(0, finish − due))`, minutes |
//! | momentum | `Σ (N − i) / max(1, dur_i) / N` |
//! | variety | `Σ |dur_i − dur_{i+1}| / (max_dur · (N − 1))` |

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::chromosome::{GeneLayout, ScheduleChromosome};
use super::operators::GeneticOperators;
use super::GaProblem;
use crate::metrics::minutes_between;
use crate::models::{ScheduledTask, TaskRecord};
use crate::weights::FitnessWeights;

/// Base short break when no session override exists (minutes).
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// A chromosome that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Gene vector length differs from `2N`.
    #[error("expected {expected} genes, got {actual}")]
    GeneCount { expected: usize, actual: usize },
    /// A gene is NaN or infinite.
    #[error("gene {index} is not finite")]
    NonFiniteGene { index: usize },
}

/// How suggested breaks are derived and simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakPolicy {
    /// Base short break for tasks whose session has no override.
    pub default_break_minutes: u32,
    /// Per-session base short break.
    pub session_breaks: BTreeMap<i64, u32>,
    /// Whether breaks advance the clock when scoring urgency.
    pub breaks_extend_elapsed: bool,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            default_break_minutes: DEFAULT_BREAK_MINUTES,
            session_breaks: BTreeMap::new(),
            breaks_extend_elapsed: true,
        }
    }
}

impl BreakPolicy {
    /// Base short break for a session.
    pub fn base_break(&self, session_id: Option<i64>) -> u32 {
        session_id
            .and_then(|id| self.session_breaks.get(&id).copied())
            .unwrap_or(self.default_break_minutes)
    }

    /// `round(base × multiplier)`, never negative.
    pub fn break_for(&self, session_id: Option<i64>, multiplier: f64) -> u32 {
        (f64::from(self.base_break(session_id)) * multiplier).round().max(0.0) as u32
    }
}

/// The three fitness components and their weighted sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Deadline urgency in `(0, 1]`.
    pub urgency: f64,
    /// Early-momentum score.
    pub momentum: f64,
    /// Duration-variety score in `[0, 1]`.
    pub variety: f64,
    /// Weighted sum.
    pub total: f64,
}

impl FitnessBreakdown {
    fn combine(urgency: f64, momentum: f64, variety: f64, weights: &FitnessWeights) -> Self {
        Self {
            urgency,
            momentum,
            variety,
            total: weights.urgency * urgency
                + weights.momentum * momentum
                + weights.variety * variety,
        }
    }
}

/// `1 / (1 + total tardiness)`.
///
/// `steps` yields `(occupied_minutes, minutes_until_due)` in schedule
/// order; occupied time includes the break when breaks extend elapsed.
pub fn urgency_score(steps: impl IntoIterator<Item = (f64, Option<f64>)>) -> f64 {
    let mut elapsed = 0.0;
    let mut total_tardiness = 0.0;
    for (occupied, due_in) in steps {
        elapsed += occupied;
        if let Some(due_in) = due_in {
            total_tardiness += (elapsed - due_in).max(0.0);
        }
    }
    1.0 / (1.0 + total_tardiness)
}

/// Position-weighted reciprocal durations, normalized by task count.
pub fn momentum_score(durations: &[u32]) -> f64 {
    let n = durations.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = durations
        .iter()
        .enumerate()
        .map(|(i, &d)| (n - i) as f64 / f64::from(d.max(1)))
        .sum();
    sum / n as f64
}

/// Mean absolute duration change between neighbours, scaled to `[0, 1]`.
pub fn variety_score(durations: &[u32]) -> f64 {
    if durations.len() <= 1 {
        return 0.0;
    }
    let max = durations.iter().map(|&d| d.max(1)).max().unwrap_or(1);
    let changes: f64 = durations
        .windows(2)
        .map(|w| (f64::from(w[0].max(1)) - f64::from(w[1].max(1))).abs())
        .sum();
    changes / (f64::from(max) * (durations.len() - 1) as f64)
}

/// Canonical order: session, then intra-session order, then ID.
pub fn canonical_order(tasks: &[TaskRecord]) -> Vec<TaskRecord> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|t| (t.session_id, t.intra_session_order, t.id));
    sorted
}

/// GA problem for ordering one user's pending tasks.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use focus_schedule::ga::{GaConfig, GaRunner, TaskOrderingProblem};
/// use focus_schedule::models::TaskRecord;
/// use focus_schedule::weights::FitnessWeights;
///
/// let tasks = vec![TaskRecord::new(1, 25), TaskRecord::new(2, 50)];
/// let problem = TaskOrderingProblem::new(&tasks, FitnessWeights::default(), Utc::now());
/// let config = GaConfig::default().with_population_size(10).with_generations(5).with_seed(1);
/// let outcome = GaRunner::run(&problem, &config);
/// assert_eq!(problem.decode(&outcome.best.genes).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TaskOrderingProblem {
    tasks: Vec<TaskRecord>,
    sessions: Vec<Vec<usize>>,
    due_offsets: Vec<Option<f64>>,
    layout: GeneLayout,
    weights: FitnessWeights,
    breaks: BreakPolicy,
    reference_time: DateTime<Utc>,
    operators: GeneticOperators,
}

impl TaskOrderingProblem {
    /// Builds the canonical index and session queues for `tasks`.
    pub fn new(
        tasks: &[TaskRecord],
        weights: FitnessWeights,
        reference_time: DateTime<Utc>,
    ) -> Self {
        let tasks = canonical_order(tasks);

        let mut sessions: Vec<Vec<usize>> = Vec::new();
        let mut current: Option<Option<i64>> = None;
        for (i, task) in tasks.iter().enumerate() {
            match sessions.last_mut() {
                Some(queue) if current == Some(task.session_id) => queue.push(i),
                _ => {
                    sessions.push(vec![i]);
                    current = Some(task.session_id);
                }
            }
        }

        let due_offsets = tasks
            .iter()
            .map(|t| t.due_date.map(|due| minutes_between(reference_time, due)))
            .collect();

        Self {
            layout: GeneLayout::for_tasks(&tasks),
            tasks,
            sessions,
            due_offsets,
            weights,
            breaks: BreakPolicy::default(),
            reference_time,
            operators: GeneticOperators::default(),
        }
    }

    /// Sets the break policy.
    pub fn with_break_policy(mut self, breaks: BreakPolicy) -> Self {
        self.breaks = breaks;
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Tasks in canonical order; gene `i` belongs to `tasks()[i]`.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Number of session queues.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Gene bounds.
    pub fn layout(&self) -> &GeneLayout {
        &self.layout
    }

    /// Fitness weights in use.
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// The instant urgency is measured from.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Decodes genes into an ordered schedule with suggested breaks.
    pub fn decode(&self, genes: &[f64]) -> Result<Vec<ScheduledTask>, DecodeError> {
        Ok(self
            .decode_order(genes)?
            .into_iter()
            .map(|(i, minutes)| ScheduledTask::with_break(self.tasks[i].clone(), minutes))
            .collect())
    }

    /// Fitness components of decoded genes.
    pub fn breakdown(&self, genes: &[f64]) -> Result<FitnessBreakdown, DecodeError> {
        let order = self.decode_order(genes)?;
        let urgency = urgency_score(order.iter().map(|&(i, minutes)| {
            (self.occupied(self.tasks[i].estimated_duration_minutes, minutes), self.due_offsets[i])
        }));
        let durations: Vec<u32> = order
            .iter()
            .map(|&(i, _)| self.tasks[i].estimated_duration_minutes)
            .collect();
        Ok(FitnessBreakdown::combine(
            urgency,
            momentum_score(&durations),
            variety_score(&durations),
            &self.weights,
        ))
    }

    /// Scores an arbitrary schedule with this problem's weights, breaks
    /// policy, and reference time.
    pub fn score_schedule(&self, schedule: &[ScheduledTask]) -> FitnessBreakdown {
        let urgency = urgency_score(schedule.iter().map(|s| {
            let due_in = s.task.due_date.map(|due| minutes_between(self.reference_time, due));
            (self.occupied(s.task.estimated_duration_minutes, s.suggested_break_minutes), due_in)
        }));
        let durations: Vec<u32> = schedule
            .iter()
            .map(|s| s.task.estimated_duration_minutes)
            .collect();
        FitnessBreakdown::combine(
            urgency,
            momentum_score(&durations),
            variety_score(&durations),
            &self.weights,
        )
    }

    fn occupied(&self, duration: u32, break_minutes: u32) -> f64 {
        if self.breaks.breaks_extend_elapsed {
            f64::from(duration) + f64::from(break_minutes)
        } else {
            f64::from(duration)
        }
    }

    /// `(canonical index, break minutes)` in schedule order.
    fn decode_order(&self, genes: &[f64]) -> Result<Vec<(usize, u32)>, DecodeError> {
        let n = self.tasks.len();
        if genes.len() != 2 * n {
            return Err(DecodeError::GeneCount {
                expected: 2 * n,
                actual: genes.len(),
            });
        }
        if let Some(index) = genes.iter().position(|g| !g.is_finite()) {
            return Err(DecodeError::NonFiniteGene { index });
        }

        let mut heads = vec![0usize; self.sessions.len()];
        let mut order = Vec::with_capacity(n);
        while order.len() < n {
            let mut selected: Option<(usize, usize)> = None;
            for (s, queue) in self.sessions.iter().enumerate() {
                let Some(&candidate) = queue.get(heads[s]) else {
                    continue;
                };
                selected = match selected {
                    Some((_, best)) if !self.precedes(candidate, best, genes) => selected,
                    _ => Some((s, candidate)),
                };
            }
            let Some((s, i)) = selected else { break };
            heads[s] += 1;
            let minutes = self.breaks.break_for(self.tasks[i].session_id, genes[n + i]);
            order.push((i, minutes));
        }
        Ok(order)
    }

    fn precedes(&self, a: usize, b: usize, genes: &[f64]) -> bool {
        match genes[a].total_cmp(&genes[b]) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => tie_break(&self.tasks[a], &self.tasks[b]) == Ordering::Less,
        }
    }
}

/// Earlier due date (dated first), then shorter duration, then lower ID.
fn tie_break(a: &TaskRecord, b: &TaskRecord) -> Ordering {
    let due = match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    due.then(a.estimated_duration_minutes.cmp(&b.estimated_duration_minutes))
        .then(a.id.cmp(&b.id))
}

impl GaProblem for TaskOrderingProblem {
    type Individual = ScheduleChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> ScheduleChromosome {
        ScheduleChromosome::random(&self.layout, rng)
    }

    fn evaluate(&self, individual: &ScheduleChromosome) -> f64 {
        match self.breakdown(&individual.genes) {
            Ok(breakdown) if breakdown.total.is_finite() && !self.tasks.is_empty() => {
                breakdown.total
            }
            Ok(_) => 0.0,
            Err(error) => {
                trace!(%error, "malformed chromosome scored 0");
                0.0
            }
        }
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &ScheduleChromosome,
        parent2: &ScheduleChromosome,
        rng: &mut R,
    ) -> ScheduleChromosome {
        self.operators.crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut ScheduleChromosome, rng: &mut R) {
        self.operators.mutate(individual, &self.layout, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule_ids;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn problem(tasks: &[TaskRecord]) -> TaskOrderingProblem {
        TaskOrderingProblem::new(tasks, FitnessWeights::default(), t0())
    }

    fn genes(priorities: &[f64]) -> Vec<f64> {
        let mut g = priorities.to_vec();
        g.resize(priorities.len() * 2, 1.0);
        g
    }

    #[test]
    fn test_canonical_order_and_sessions() {
        let tasks = vec![
            TaskRecord::new(5, 10).with_session(2, 1),
            TaskRecord::new(3, 10),
            TaskRecord::new(4, 10).with_session(2, 0),
            TaskRecord::new(1, 10),
        ];
        let p = problem(&tasks);
        let ids: Vec<i64> = p.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
        assert_eq!(p.session_count(), 2);
        assert_eq!(p.layout().len(), 8);
    }

    #[test]
    fn test_decode_by_priority() {
        let tasks = vec![TaskRecord::new(1, 10), TaskRecord::new(2, 20), TaskRecord::new(3, 30)];
        let p = problem(&tasks);
        let schedule = p.decode(&genes(&[0.2, 0.9, 0.5])).unwrap();
        // Single implicit session: queue order is fixed.
        assert_eq!(schedule_ids(&schedule), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_interleaves_sessions() {
        let tasks = vec![
            TaskRecord::new(1, 10).with_session(1, 0),
            TaskRecord::new(2, 10).with_session(1, 1),
            TaskRecord::new(3, 10).with_session(2, 0),
            TaskRecord::new(4, 10).with_session(2, 1),
        ];
        let p = problem(&tasks);
        // Heads: 1 (0.1) vs 3 (0.8) → 3; then 1 (0.1) vs 4 (0.05) → 1; then 2 vs 4.
        let schedule = p.decode(&genes(&[0.1, 0.9, 0.8, 0.05])).unwrap();
        assert_eq!(schedule_ids(&schedule), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_tie_break_on_equal_priorities() {
        let tasks = vec![
            TaskRecord::new(1, 30).with_session(1, 0),
            TaskRecord::new(2, 10).with_session(2, 0),
            TaskRecord::new(3, 50).with_session(3, 0).with_due_date(t0() + Duration::hours(5)),
            TaskRecord::new(4, 10).with_session(4, 0),
        ];
        let p = problem(&tasks);
        let schedule = p.decode(&genes(&[0.5, 0.5, 0.5, 0.5])).unwrap();
        assert_eq!(schedule_ids(&schedule), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_break_from_multiplier() {
        let tasks = vec![
            TaskRecord::new(1, 10).with_session(7, 0),
            TaskRecord::new(2, 10),
        ];
        let mut policy = BreakPolicy::default();
        policy.session_breaks.insert(7, 10);
        let p = problem(&tasks).with_break_policy(policy);
        // Canonical: 2 (no session), 1 (session 7).
        let schedule = p.decode(&[0.9, 0.1, 1.2, 1.4]).unwrap();
        assert_eq!(schedule_ids(&schedule), vec![2, 1]);
        assert_eq!(schedule[0].suggested_break_minutes, 6);
        assert_eq!(schedule[1].suggested_break_minutes, 14);
    }

    #[test]
    fn test_malformed_genes() {
        let tasks = vec![TaskRecord::new(1, 10), TaskRecord::new(2, 20)];
        let p = problem(&tasks);
        assert_eq!(
            p.decode(&[0.5; 3]),
            Err(DecodeError::GeneCount { expected: 4, actual: 3 })
        );
        assert_eq!(
            p.decode(&[0.5, f64::NAN, 1.0, 1.0]),
            Err(DecodeError::NonFiniteGene { index: 1 })
        );
        assert_eq!(p.evaluate(&ScheduleChromosome::from_genes(vec![0.5; 3])), 0.0);
    }

    #[test]
    fn test_momentum_prefers_short_first() {
        assert!(momentum_score(&[25, 35, 45, 55]) > momentum_score(&[55, 45, 35, 25]));
        assert!((momentum_score(&[10]) - 0.1).abs() < 1e-12);
        assert_eq!(momentum_score(&[]), 0.0);
    }

    #[test]
    fn test_variety() {
        assert_eq!(variety_score(&[30]), 0.0);
        assert_eq!(variety_score(&[30, 30, 30]), 0.0);
        // |10-50| + |50-10| = 80; 80 / (50 · 2) = 0.8
        assert!((variety_score(&[10, 50, 10]) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_urgency() {
        assert_eq!(urgency_score([(30.0, None), (20.0, None)]), 1.0);
        // Finishes at 50, due at 40 → tardiness 10.
        assert!((urgency_score([(30.0, None), (20.0, Some(40.0))]) - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_urgent_task_first_scores_higher() {
        let tasks = vec![
            TaskRecord::new(1, 30).with_due_date(t0() + Duration::minutes(10)),
            TaskRecord::new(2, 30).with_due_date(t0() + Duration::minutes(120)),
        ];
        let p = problem(&tasks);
        let urgent_first = p.breakdown(&genes(&[0.9, 0.1])).unwrap();
        let urgent_last = p.breakdown(&genes(&[0.1, 0.9])).unwrap();
        // Implicit session keeps canonical order either way.
        assert_eq!(urgent_first, urgent_last);

        let split: Vec<TaskRecord> = tasks
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, t)| t.with_session(i as i64, 0))
            .collect();
        let p = problem(&split);
        let urgent_first = p.breakdown(&genes(&[0.9, 0.1])).unwrap();
        let urgent_last = p.breakdown(&genes(&[0.1, 0.9])).unwrap();
        assert!(urgent_first.urgency > urgent_last.urgency);
        assert!(urgent_first.total > urgent_last.total);
    }

    #[test]
    fn test_breaks_extend_elapsed_switch() {
        let tasks = vec![TaskRecord::new(1, 30).with_due_date(t0() + Duration::minutes(32))];
        let with_breaks = problem(&tasks);
        let without = problem(&tasks).with_break_policy(BreakPolicy {
            breaks_extend_elapsed: false,
            ..BreakPolicy::default()
        });
        let g = genes(&[0.5]);
        assert!(with_breaks.breakdown(&g).unwrap().urgency < 1.0);
        assert_eq!(without.breakdown(&g).unwrap().urgency, 1.0);
    }

    #[test]
    fn test_score_schedule_matches_breakdown() {
        let tasks = vec![
            TaskRecord::new(1, 25).with_session(1, 0),
            TaskRecord::new(2, 45).with_session(2, 0).with_due_date(t0() + Duration::minutes(40)),
        ];
        let p = problem(&tasks);
        let g = vec![0.3, 0.6, 0.9, 1.1];
        let schedule = p.decode(&g).unwrap();
        assert_eq!(p.score_schedule(&schedule), p.breakdown(&g).unwrap());
    }
}
