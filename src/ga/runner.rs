//! Generational genetic search.
//!
//! A small generic GA: any [`GaProblem`] whose individuals implement
//! [`Individual`] can be searched. Fitness is maximized.
//!
//! # Generation loop
//!
//! 1. Evaluate unevaluated individuals
//! 2. Record the best-so-far fitness
//! 3. Carry the top `elitism_count` individuals unchanged
//! 4. Fill the rest by tournament selection, crossover, and mutation
//!
//! # Determinism
//!
//! Every child slot draws its own seed from the master generator before
//! breeding starts, so a fixed `seed` gives the same outcome with
//! `parallel` on or off.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::operators::{CrossoverType, GeneticOperators, tournament_select};
use super::problem::{BreakPolicy, DEFAULT_BREAK_MINUTES};

/// A member of the population.
pub trait Individual: Clone + Send + Sync {
    /// Cached fitness, `None` until evaluated.
    fn fitness(&self) -> Option<f64>;

    /// Stores the evaluated fitness.
    fn set_fitness(&mut self, fitness: f64);
}

/// A problem the genetic search can optimize.
pub trait GaProblem: Sync {
    /// Individual representation.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Fitness of an individual (higher = better).
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces one child from two parents.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> Self::Individual;

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations to run.
    pub generations: usize,
    /// Per-gene resample probability.
    pub mutation_probability: f64,
    /// Probability that selected parents are recombined.
    pub crossover_probability: f64,
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elitism_count: usize,
    /// Master seed; drawn from OS entropy when `None`.
    pub seed: Option<u64>,
    /// Breed and evaluate each generation on the rayon pool.
    pub parallel: bool,
    /// Base short break for tasks outside any configured session (minutes).
    pub default_break_minutes: u32,
    /// Per-session base short break (minutes).
    pub session_breaks: BTreeMap<i64, u32>,
    /// Whether suggested breaks advance the clock when scoring urgency.
    pub breaks_extend_elapsed: bool,
    /// Instant urgency is measured from; `Utc::now()` at call entry when `None`.
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 80,
            generations: 120,
            mutation_probability: 0.15,
            crossover_probability: 1.0,
            crossover_type: CrossoverType::Uniform,
            tournament_size: 4,
            elitism_count: 4,
            seed: None,
            parallel: true,
            default_break_minutes: DEFAULT_BREAK_MINUTES,
            session_breaks: BTreeMap::new(),
            breaks_extend_elapsed: true,
            reference_time: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Sets the crossover strategy and probability.
    pub fn with_crossover(mut self, crossover_type: CrossoverType, probability: f64) -> Self {
        self.crossover_type = crossover_type;
        self.crossover_probability = probability;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the elitism count.
    pub fn with_elitism(mut self, count: usize) -> Self {
        self.elitism_count = count;
        self
    }

    /// Fixes the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables rayon parallelism.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the default base short break.
    pub fn with_default_break(mut self, minutes: u32) -> Self {
        self.default_break_minutes = minutes;
        self
    }

    /// Overrides the base short break for one session.
    pub fn with_session_break(mut self, session_id: i64, minutes: u32) -> Self {
        self.session_breaks.insert(session_id, minutes);
        self
    }

    /// Chooses whether breaks count toward elapsed time for urgency.
    pub fn with_breaks_extend_elapsed(mut self, enabled: bool) -> Self {
        self.breaks_extend_elapsed = enabled;
        self
    }

    /// Pins the urgency reference instant.
    pub fn with_reference_time(mut self, time: DateTime<Utc>) -> Self {
        self.reference_time = Some(time);
        self
    }

    /// Break settings as a [`BreakPolicy`].
    pub fn break_policy(&self) -> BreakPolicy {
        BreakPolicy {
            default_break_minutes: self.default_break_minutes,
            session_breaks: self.session_breaks.clone(),
            breaks_extend_elapsed: self.breaks_extend_elapsed,
        }
    }

    /// Crossover and mutation settings as [`GeneticOperators`].
    pub fn operators(&self) -> GeneticOperators {
        GeneticOperators::default()
            .with_crossover(self.crossover_type, self.crossover_probability)
            .with_mutation_probability(self.mutation_probability)
    }
}

/// Result of a genetic search.
#[derive(Debug, Clone)]
pub struct GaOutcome<I> {
    /// Best individual observed in any generation.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations evaluated.
    pub generations: usize,
    /// Best-so-far fitness after each evaluated generation.
    pub history: Vec<f64>,
    /// Master seed actually used.
    pub seed: u64,
    /// Whether the search stopped early on request.
    pub cancelled: bool,
}

/// Runs the genetic search.
pub struct GaRunner;

impl GaRunner {
    /// Runs to completion.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> GaOutcome<P::Individual> {
        Self::run_with_cancel(problem, config, &AtomicBool::new(false))
    }

    /// Runs until the generation budget is spent or `cancel` is set.
    ///
    /// `cancel` is read between generations; at least one generation is
    /// always evaluated.
    pub fn run_with_cancel<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        cancel: &AtomicBool,
    ) -> GaOutcome<P::Individual> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut master = SmallRng::seed_from_u64(seed);
        let population_size = config.population_size.max(2);
        let generations = config.generations.max(1);
        let elitism = config.elitism_count.min(population_size - 1);

        debug!(
            seed,
            population_size,
            generations,
            elitism,
            parallel = config.parallel,
            "starting genetic search"
        );

        let seeds = draw_seeds(&mut master, population_size);
        let mut population: Vec<P::Individual> = map_seeds(config.parallel, &seeds, |rng| {
            problem.create_individual(rng)
        });

        let mut best: Option<P::Individual> = None;
        let mut best_fitness = f64::NEG_INFINITY;
        let mut history = Vec::with_capacity(generations);
        let mut cancelled = false;

        for generation in 0..generations {
            if generation > 0 && cancel.load(Ordering::Relaxed) {
                cancelled = true;
                debug!(generation, "genetic search cancelled");
                break;
            }

            evaluate_population(problem, &mut population, config.parallel);
            population.sort_by(|a, b| fitness_of(b).total_cmp(&fitness_of(a)));

            let leader = fitness_of(&population[0]);
            if best.is_none() || leader > best_fitness {
                best_fitness = leader;
                best = Some(population[0].clone());
            }
            history.push(best_fitness);
            trace!(generation, leader, best = best_fitness, "generation evaluated");

            if generation + 1 < generations {
                population = next_generation(problem, &population, config, elitism, &mut master);
            }
        }

        let best = match best {
            Some(best) => best,
            None => population.swap_remove(0),
        };
        debug!(best_fitness, generations = history.len(), cancelled, "genetic search finished");

        GaOutcome {
            best,
            best_fitness,
            generations: history.len(),
            history,
            seed,
            cancelled,
        }
    }
}

fn fitness_of<I: Individual>(individual: &I) -> f64 {
    individual.fitness().unwrap_or(f64::NEG_INFINITY)
}

fn draw_seeds(master: &mut SmallRng, count: usize) -> Vec<u64> {
    (0..count).map(|_| master.random()).collect()
}

fn map_seeds<T, F>(parallel: bool, seeds: &[u64], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut SmallRng) -> T + Sync + Send,
{
    let run = |&seed: &u64| f(&mut SmallRng::seed_from_u64(seed));
    if parallel {
        seeds.par_iter().map(run).collect()
    } else {
        seeds.iter().map(run).collect()
    }
}

fn evaluate_population<P: GaProblem>(
    problem: &P,
    population: &mut [P::Individual],
    parallel: bool,
) {
    let score = |individual: &mut P::Individual| {
        if individual.fitness().is_none() {
            let fitness = problem.evaluate(individual);
            individual.set_fitness(if fitness.is_finite() { fitness } else { 0.0 });
        }
    };
    if parallel {
        population.par_iter_mut().for_each(score);
    } else {
        population.iter_mut().for_each(score);
    }
}

/// `population` must be sorted best first.
fn next_generation<P: GaProblem>(
    problem: &P,
    population: &[P::Individual],
    config: &GaConfig,
    elitism: usize,
    master: &mut SmallRng,
) -> Vec<P::Individual> {
    let seeds = draw_seeds(master, population.len() - elitism);
    let children = map_seeds(config.parallel, &seeds, |rng| {
        let parent1 = tournament_select(population, config.tournament_size, rng);
        let parent2 = tournament_select(population, config.tournament_size, rng);
        let mut child = problem.crossover(parent1, parent2, rng);
        problem.mutate(&mut child, rng);
        child
    });

    let mut next = Vec::with_capacity(population.len());
    next.extend_from_slice(&population[..elitism]);
    next.extend(children);
    next
}
