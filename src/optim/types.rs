//! Search problem contract and the population solution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use rand::Rng;

use crate::entity::Population;
use crate::error::Result;
use crate::fitness::FitnessEvaluator;

/// A minimization problem explored by local search.
///
/// Implemented by [`PopulationProblem`](super::PopulationProblem) and
/// [`MultiLayerProblem`](super::MultiLayerProblem); every runner in this
/// module works on any implementation.
///
/// # Buffer
///
/// `buffer` is the number of elementary moves folded into one neighbor.
/// Runners widen it while fitness is poor and narrow it as fitness
/// improves.
pub trait SearchProblem {
    /// The solution representation.
    type Solution: Clone;

    /// Starting point of a run.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Result<Self::Solution>;

    /// Fitness of a solution. Lower is better; 0 is a perfect fit.
    fn fitness(&self, solution: &Self::Solution) -> Result<f64>;

    /// One random neighbor, or `None` when no move is possible.
    fn neighbor<R: Rng>(
        &self,
        solution: &Self::Solution,
        buffer: usize,
        rng: &mut R,
    ) -> Result<Option<Self::Solution>>;

    /// A set of neighbors covering the solution's move types.
    fn neighborhood<R: Rng>(
        &self,
        solution: &Self::Solution,
        buffer: usize,
        rng: &mut R,
    ) -> Result<Vec<Self::Solution>>;

    /// Hash identifying equivalent solutions (tabu memory).
    fn fingerprint(&self, solution: &Self::Solution) -> u64;
}

/// A candidate population plus the sample it draws replacements from and
/// the evaluator that scores it.
///
/// Fitness is computed on first request and cached; a solution is never
/// mutated after creation, neighbors are new solutions.
#[derive(Debug, Clone)]
pub struct Solution {
    population: Population,
    sample: Arc<Population>,
    evaluator: Arc<FitnessEvaluator>,
    fitness: OnceLock<f64>,
}

impl Solution {
    pub fn new(population: Population, sample: Arc<Population>, evaluator: Arc<FitnessEvaluator>) -> Self {
        Self {
            population,
            sample,
            evaluator,
            fitness: OnceLock::new(),
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn sample(&self) -> &Arc<Population> {
        &self.sample
    }

    pub fn into_population(self) -> Population {
        self.population
    }

    pub fn evaluator(&self) -> &Arc<FitnessEvaluator> {
        &self.evaluator
    }

    /// Fitness against the bound evaluator, cached after the first call.
    pub fn fitness(&self) -> Result<f64> {
        if let Some(&fitness) = self.fitness.get() {
            return Ok(fitness);
        }
        let fitness = self.evaluator.evaluate(&self.population)?;
        Ok(*self.fitness.get_or_init(|| fitness))
    }

    /// Fitness against `evaluator`; only the bound evaluator's score is
    /// cached.
    pub fn fitness_against(&self, evaluator: &Arc<FitnessEvaluator>) -> Result<f64> {
        if Arc::ptr_eq(evaluator, &self.evaluator) {
            self.fitness()
        } else {
            evaluator.evaluate(&self.population)
        }
    }

    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness.get().copied()
    }
}

/// Buffer proportional to how far fitness still is from zero, relative to
/// where the run started.
pub(crate) fn adaptive_buffer(max_buffer: usize, fitness: f64, initial: f64) -> usize {
    let max_buffer = max_buffer.max(1);
    if initial <= 0.0 || !fitness.is_finite() {
        return 1;
    }
    let scaled = (max_buffer as f64 * fitness / initial).ceil();
    (scaled as usize).clamp(1, max_buffer)
}

pub(crate) fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Shared test fixtures for the runners.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Integer line with fitness `(x - 7)²`; moves are steps of up to
    /// `buffer`.
    pub(crate) struct Parabola {
        pub start: i64,
    }

    impl SearchProblem for Parabola {
        type Solution = i64;

        fn initial_solution<R: Rng>(&self, _rng: &mut R) -> Result<i64> {
            Ok(self.start)
        }

        fn fitness(&self, x: &i64) -> Result<f64> {
            Ok(((x - 7) * (x - 7)) as f64)
        }

        fn neighbor<R: Rng>(&self, x: &i64, buffer: usize, rng: &mut R) -> Result<Option<i64>> {
            let step = rng.random_range(1..=buffer.max(1) as i64);
            Ok(Some(if rng.random_bool(0.5) { x + step } else { x - step }))
        }

        fn neighborhood<R: Rng>(&self, x: &i64, buffer: usize, _rng: &mut R) -> Result<Vec<i64>> {
            let b = buffer.max(1) as i64;
            Ok((1..=b).flat_map(|d| [x - d, x + d]).collect())
        }

        fn fingerprint(&self, x: &i64) -> u64 {
            *x as u64
        }
    }
}
