//! Configurable genetic operators for random-key chromosomes.
//!
//! Provides runtime-selectable crossover via [`GeneticOperators`], plus
//! the tournament selection and bounded resample mutation the search
//! uses every generation.
//!
//! # Usage
//!
//! ```
//! use focus_schedule::ga::operators::{CrossoverType, GeneticOperators};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! assert_eq!(ops.mutation_probability, 0.15);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Individual;
use super::chromosome::{GeneLayout, ScheduleChromosome};

/// Crossover strategy for random-key chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Each gene taken from either parent with probability 1/2.
    #[default]
    Uniform,
    /// Prefix from the first parent, suffix from the second.
    SinglePoint,
    /// Middle segment from the second parent.
    TwoPoint,
}

/// Runtime-selectable genetic operators.
///
/// # Example
///
/// ```
/// use focus_schedule::ga::operators::{CrossoverType, GeneticOperators};
///
/// let ops = GeneticOperators::default()
///     .with_crossover(CrossoverType::TwoPoint, 0.9)
///     .with_mutation_probability(0.05);
/// assert_eq!(ops.crossover_type, CrossoverType::TwoPoint);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Probability that two parents are recombined at all.
    pub crossover_probability: f64,
    /// Per-gene resample probability.
    pub mutation_probability: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::Uniform,
            crossover_probability: 1.0,
            mutation_probability: 0.15,
        }
    }
}

impl GeneticOperators {
    /// Sets the crossover strategy and its application probability.
    pub fn with_crossover(mut self, crossover_type: CrossoverType, probability: f64) -> Self {
        self.crossover_type = crossover_type;
        self.crossover_probability = probability;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Produces one child.
    ///
    /// Without recombination the child is a copy of `parent1`. The child
    /// is always unevaluated.
    pub fn crossover<R: Rng>(
        &self,
        parent1: &ScheduleChromosome,
        parent2: &ScheduleChromosome,
        rng: &mut R,
    ) -> ScheduleChromosome {
        if !rng.random_bool(self.crossover_probability) {
            return ScheduleChromosome::from_genes(parent1.genes.clone());
        }
        let genes = match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(&parent1.genes, &parent2.genes, rng),
            CrossoverType::SinglePoint => {
                single_point_crossover(&parent1.genes, &parent2.genes, rng)
            }
            CrossoverType::TwoPoint => two_point_crossover(&parent1.genes, &parent2.genes, rng),
        };
        ScheduleChromosome::from_genes(genes)
    }

    /// Resamples each gene within its bounds with the mutation probability.
    pub fn mutate<R: Rng>(
        &self,
        individual: &mut ScheduleChromosome,
        layout: &GeneLayout,
        rng: &mut R,
    ) {
        let mut changed = false;
        for (i, gene) in individual.genes.iter_mut().enumerate().take(layout.len()) {
            if rng.random_bool(self.mutation_probability) {
                *gene = layout.sample(i, rng);
                changed = true;
            }
        }
        if changed {
            individual.fitness = None;
        }
    }
}

/// Per-gene coin flip between the parents.
pub fn uniform_crossover<R: Rng>(p1: &[f64], p2: &[f64], rng: &mut R) -> Vec<f64> {
    p1.iter()
        .zip(p2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect()
}

/// `p1[..cut] ++ p2[cut..]` with `cut ∈ [1, len)`.
pub fn single_point_crossover<R: Rng>(p1: &[f64], p2: &[f64], rng: &mut R) -> Vec<f64> {
    let len = p1.len().min(p2.len());
    if len < 2 {
        return p1.to_vec();
    }
    let cut = rng.random_range(1..len);
    p1[..cut].iter().chain(&p2[cut..len]).copied().collect()
}

/// `p1[..a] ++ p2[a..b] ++ p1[b..]` with `0 < a < b ≤ len`.
pub fn two_point_crossover<R: Rng>(p1: &[f64], p2: &[f64], rng: &mut R) -> Vec<f64> {
    let len = p1.len().min(p2.len());
    if len < 3 {
        return single_point_crossover(p1, p2, rng);
    }
    let a = rng.random_range(1..len - 1);
    let b = rng.random_range(a + 1..=len);
    let mut child = p1[..len].to_vec();
    child[a..b].copy_from_slice(&p2[a..b]);
    child
}

/// Tournament selection.
///
/// Samples `size` members uniformly with replacement and returns the
/// fittest. Unevaluated members count as worst.
pub fn tournament_select<'a, I: Individual, R: Rng>(
    population: &'a [I],
    size: usize,
    rng: &mut R,
) -> &'a I {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..size.max(1) {
        let challenger = &population[rng.random_range(0..population.len())];
        let challenger_fitness = challenger.fitness().unwrap_or(f64::NEG_INFINITY);
        if challenger_fitness > best.fitness().unwrap_or(f64::NEG_INFINITY) {
            best = challenger;
        }
    }
    best
}
