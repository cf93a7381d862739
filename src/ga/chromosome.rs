//! Random-key chromosome for task ordering.
//!
//! # Encoding
//!
//! For `N` tasks in canonical order the chromosome holds `2N` real genes:
//! - **Priority keys** `[0, N)`: one per task, bounded `[0, 1]`. Decoding
//!   picks the highest key among the session queue heads.
//! - **Break multipliers** `[N, 2N)`: one per task, scaling the session's
//!   base short break. Bounds widen with cognitive load.
//!
//! # Reference
//! Bean (1994), "Genetic Algorithms and Random Keys for Sequencing and
//! Optimization"

use rand::Rng;

use super::Individual;
use crate::models::TaskRecord;

/// Break multiplier range for a cognitive load level (clamped to 1–5).
///
/// Heavier tasks get longer, more variable breaks after them.
pub fn break_multiplier_bounds(load: u8) -> (f64, f64) {
    match load.clamp(1, 5) {
        1 => (0.8, 1.0),
        2 => (0.9, 1.1),
        3 => (1.0, 1.2),
        4 => (1.1, 1.4),
        _ => (1.2, 1.5),
    }
}

/// Per-gene bounds of a chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneLayout {
    task_count: usize,
    bounds: Vec<(f64, f64)>,
}

impl GeneLayout {
    /// Builds the layout for tasks in canonical order.
    pub fn for_tasks(tasks: &[TaskRecord]) -> Self {
        let mut bounds = vec![(0.0, 1.0); tasks.len()];
        bounds.extend(tasks.iter().map(|t| break_multiplier_bounds(t.clamped_load())));
        Self {
            task_count: tasks.len(),
            bounds,
        }
    }

    /// Number of tasks encoded.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Total gene count (`2N`).
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the layout encodes no tasks.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Bounds of one gene.
    pub fn bounds(&self, gene: usize) -> (f64, f64) {
        self.bounds[gene]
    }

    /// Draws one gene uniformly within its bounds.
    pub fn sample<R: Rng>(&self, gene: usize, rng: &mut R) -> f64 {
        let (low, high) = self.bounds[gene];
        rng.random_range(low..=high)
    }

    /// Whether every gene of `genes` lies within its bounds.
    pub fn contains(&self, genes: &[f64]) -> bool {
        genes.len() == self.bounds.len()
            && genes
                .iter()
                .zip(&self.bounds)
                .all(|(g, (low, high))| (*low..=*high).contains(g))
    }
}

/// Random-key chromosome.
///
/// Higher fitness = better schedule (maximization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleChromosome {
    /// Priority keys followed by break multipliers.
    pub genes: Vec<f64>,
    /// Fitness, `None` until evaluated.
    pub fitness: Option<f64>,
}

impl Individual for ScheduleChromosome {
    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }
}

impl ScheduleChromosome {
    /// Wraps explicit genes (unevaluated).
    pub fn from_genes(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Creates a chromosome with every gene drawn uniformly within bounds.
    pub fn random<R: Rng>(layout: &GeneLayout, rng: &mut R) -> Self {
        let genes = (0..layout.len()).map(|i| layout.sample(i, rng)).collect();
        Self::from_genes(genes)
    }

    /// Priority keys (first half).
    pub fn priorities(&self) -> &[f64] {
        &self.genes[..self.genes.len() / 2]
    }

    /// Break multipliers (second half).
    pub fn multipliers(&self) -> &[f64] {
        &self.genes[self.genes.len() / 2..]
    }
}
