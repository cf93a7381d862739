//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Arrival**: FCFS
//! - **Time-based**: SPT, LPT, WSPT
//! - **Due-date**: EDD
//! - **Cognitive load**: CLS-ASC, CLS-DESC
//!
//! # Score Convention
//! All rules return lower scores for higher priority tasks.

use super::{DispatchingRule, RuleScore};
use crate::models::TaskRecord;

// ======================== Arrival rules ========================

/// First-Come-First-Served.
///
/// Orders by task ID, the proxy for creation order.
#[derive(Debug, Clone, Copy)]
pub struct Fcfs;

impl DispatchingRule for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        task.id as f64
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// # Reference
/// Smith (1956), optimal for minimizing total completion time on a
/// single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        f64::from(task.estimated_duration_minutes)
    }
}

/// Longest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        -f64::from(task.estimated_duration_minutes)
    }
}

/// Weighted Shortest Processing Time.
///
/// Prioritizes by `weight / duration` with `weight = clamped_load²`.
///
/// # Reference
/// Smith (1956), optimal for minimizing weighted completion time.
#[derive(Debug, Clone, Copy)]
pub struct Wspt;

impl Wspt {
    /// The ratio WSPT sorts on (descending).
    pub fn ratio(task: &TaskRecord) -> f64 {
        task.weight() / f64::from(task.effective_duration())
    }
}

impl DispatchingRule for Wspt {
    fn name(&self) -> &'static str {
        "WSPT"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        -Self::ratio(task) // Higher ratio = higher priority → negate
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Tasks without due dates score `+∞` and, under a stable sort, keep
/// their relative order behind all dated tasks.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        task.due_date
            .map(|d| d.timestamp_millis() as f64)
            .unwrap_or(f64::INFINITY)
    }
}

// ======================== Cognitive load rules ========================

/// Cognitive Load Sorted, ascending (easy first).
#[derive(Debug, Clone, Copy)]
pub struct ClsAsc;

impl DispatchingRule for ClsAsc {
    fn name(&self) -> &'static str {
        "CLS_ASC"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        f64::from(task.clamped_load())
    }
}

/// Cognitive Load Sorted, descending (hard first).
#[derive(Debug, Clone, Copy)]
pub struct ClsDesc;

impl DispatchingRule for ClsDesc {
    fn name(&self) -> &'static str {
        "CLS_DESC"
    }

    fn evaluate(&self, task: &TaskRecord) -> RuleScore {
        -f64::from(task.clamped_load())
    }
}
