//! Baseline scheduler registry.
//!
//! Names the eight comparison baselines and runs them. Seven are
//! deterministic rule sorts; `Random` is a seeded uniform shuffle used as
//! the null-hypothesis baseline.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{RuleEngine, rules};
use crate::models::TaskRecord;

/// A baseline ordering heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Baseline {
    /// Seeded uniform shuffle.
    Random,
    /// Ascending ID.
    Fcfs,
    /// Ascending duration.
    Spt,
    /// Descending duration.
    Lpt,
    /// Ascending due date, undated last.
    Edd,
    /// Descending weight / duration.
    Wspt,
    /// Ascending cognitive load.
    ClsAsc,
    /// Descending cognitive load.
    ClsDesc,
}

impl Baseline {
    /// All baselines.
    pub const ALL: [Baseline; 8] = [
        Baseline::Random,
        Baseline::Fcfs,
        Baseline::Spt,
        Baseline::Lpt,
        Baseline::Edd,
        Baseline::Wspt,
        Baseline::ClsAsc,
        Baseline::ClsDesc,
    ];

    /// Short name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Baseline::Random => "RND",
            Baseline::Fcfs => "FCFS",
            Baseline::Spt => "SPT",
            Baseline::Lpt => "LPT",
            Baseline::Edd => "EDD",
            Baseline::Wspt => "WSPT",
            Baseline::ClsAsc => "CLS_ASC",
            Baseline::ClsDesc => "CLS_DESC",
        }
    }

    /// Whether repeated runs always give the same order.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Baseline::Random)
    }

    /// Orders `tasks`. `seed` is only read by [`Baseline::Random`].
    pub fn schedule(self, tasks: &[TaskRecord], seed: u64) -> Vec<TaskRecord> {
        match self.engine() {
            Some(engine) => engine.sort(tasks),
            None => random_order(tasks, seed),
        }
    }

    /// The rule engine behind a deterministic baseline.
    pub fn engine(self) -> Option<RuleEngine> {
        let engine = RuleEngine::new();
        let engine = match self {
            Baseline::Random => return None,
            Baseline::Fcfs => engine.with_rule(rules::Fcfs),
            Baseline::Spt => engine.with_rule(rules::Spt),
            Baseline::Lpt => engine.with_rule(rules::Lpt),
            Baseline::Edd => engine.with_rule(rules::Edd),
            Baseline::Wspt => engine.with_rule(rules::Wspt),
            Baseline::ClsAsc => engine.with_rule(rules::ClsAsc),
            Baseline::ClsDesc => engine.with_rule(rules::ClsDesc),
        };
        Some(engine)
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Baseline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Baseline::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(&normalized))
            .or_else(|| normalized.eq_ignore_ascii_case("random").then_some(Baseline::Random))
            .ok_or_else(|| format!("unknown baseline '{s}'"))
    }
}

/// Uniform shuffle of `tasks`, reproducible for a given seed.
pub fn random_order(tasks: &[TaskRecord], seed: u64) -> Vec<TaskRecord> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut result = tasks.to_vec();
    result.shuffle(&mut rng);
    result
}
