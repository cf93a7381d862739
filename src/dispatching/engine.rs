//! Rule engine for multi-criteria dispatching.
//!
//! Applies a primary rule and any number of tie-breaking rules in
//! sequence. Sorting is stable: tasks tied on every rule keep their
//! input order unless a final tie-breaker says otherwise.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore};
use crate::models::TaskRecord;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    InputOrder,
    /// Ascending task ID.
    ById,
}

/// A composable rule engine for task ordering.
///
/// # Example
/// ```
/// use focus_schedule::dispatching::{RuleEngine, rules};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_tie_breaker(rules::Spt);
/// assert_eq!(engine.rule_names(), vec!["EDD", "SPT"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Adds a rule. Rules are consulted in the order they are added.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a tie-breaking rule, consulted only when earlier rules tie.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, primary first.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Returns indices into `tasks`, highest priority first.
    pub fn sort_indices(&self, tasks: &[TaskRecord]) -> Vec<usize> {
        let scores: Vec<Vec<RuleScore>> = tasks.iter().map(|t| self.evaluate(t)).collect();
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&tasks[a], &scores[a], &tasks[b], &scores[b]));
        indices
    }

    /// Returns a reordered copy of `tasks`.
    pub fn sort(&self, tasks: &[TaskRecord]) -> Vec<TaskRecord> {
        self.sort_indices(tasks)
            .into_iter()
            .map(|i| tasks[i].clone())
            .collect()
    }

    /// Scores from each rule for one task.
    pub fn evaluate(&self, task: &TaskRecord) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(task)).collect()
    }

    fn compare(
        &self,
        a: &TaskRecord,
        scores_a: &[RuleScore],
        b: &TaskRecord,
        scores_b: &[RuleScore],
    ) -> Ordering {
        for (sa, sb) in scores_a.iter().zip(scores_b) {
            if (sa - sb).abs() > self.epsilon {
                return sa.partial_cmp(sb).unwrap_or(Ordering::Equal);
            }
        }

        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
