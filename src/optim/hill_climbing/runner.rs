//! Hill climbing execution loop.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info};
use u_numflow::random::create_rng;

use super::config::HillClimbingConfig;
use crate::error::{Result, SynthError};
use crate::optim::types::{adaptive_buffer, is_cancelled, SearchProblem};

const LOG_EVERY: usize = 100;

/// Result of a hill climbing run.
#[derive(Debug, Clone)]
pub struct HillClimbingResult<S: Clone> {
    /// The best solution found.
    pub best: S,
    /// Fitness of the best solution.
    pub best_fitness: f64,
    /// Neighbor evaluations performed.
    pub iterations: usize,
    /// Best fitness before the first iteration and after each one.
    pub fitness_history: Vec<f64>,
    /// Whether cancelled externally.
    pub cancelled: bool,
    /// Whether the best fitness reached the threshold.
    pub reached_threshold: bool,
}

/// Strict-improvement local search.
///
/// Each iteration draws one random neighbor of the best solution with a
/// buffer proportional to the remaining fitness, and keeps it only if it
/// is strictly better.
pub struct HillClimbingRunner;

impl HillClimbingRunner {
    pub fn run<P: SearchProblem>(problem: &P, config: &HillClimbingConfig) -> Result<HillClimbingResult<P::Solution>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs with an optional cancellation flag, checked once per iteration.
    pub fn run_with_cancel<P: SearchProblem>(
        problem: &P,
        config: &HillClimbingConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<HillClimbingResult<P::Solution>> {
        config.validate().map_err(SynthError::InvalidConfig)?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let mut best = problem.initial_solution(&mut rng)?;
        let mut best_fitness = problem.fitness(&best)?;
        let initial_fitness = best_fitness;
        let mut fitness_history = vec![best_fitness];
        let mut iterations = 0usize;
        let mut cancelled = false;
        let mut reached_threshold = best_fitness <= config.fitness_threshold;

        while !reached_threshold && iterations < config.max_iterations {
            if is_cancelled(&cancel) {
                cancelled = true;
                break;
            }

            let buffer = adaptive_buffer(config.max_buffer, best_fitness, initial_fitness);
            let Some(candidate) = problem.neighbor(&best, buffer, &mut rng)? else {
                debug!("hill climbing: no neighbor at iteration {iterations}, stopping");
                break;
            };
            let fitness = problem.fitness(&candidate)?;
            if fitness < best_fitness {
                best = candidate;
                best_fitness = fitness;
            }

            iterations += 1;
            fitness_history.push(best_fitness);
            reached_threshold = best_fitness <= config.fitness_threshold;

            if iterations.is_multiple_of(LOG_EVERY) {
                debug!("hill climbing: iteration {iterations}, best {best_fitness:.6}, buffer {buffer}");
            }
        }

        info!(
            "hill climbing finished: {iterations} iterations, best fitness {best_fitness:.6} (initial {initial_fitness:.6})"
        );

        Ok(HillClimbingResult {
            best,
            best_fitness,
            iterations,
            fitness_history,
            cancelled,
            reached_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::neighbor::ShiftPolicy;
    use crate::optim::problem::testing::{census, problem};
    use crate::optim::types::testing::Parabola;

    #[test]
    fn test_parabola_reaches_minimum() {
        let config = HillClimbingConfig::default()
            .with_max_iterations(2000)
            .with_max_buffer(8)
            .with_seed(42);
        let result = HillClimbingRunner::run(&Parabola { start: -60 }, &config).unwrap();
        assert_eq!(result.best, 7);
        assert_eq!(result.best_fitness, 0.0);
        assert!(result.reached_threshold);
        assert!(result.iterations < 2000);
    }

    #[test]
    fn test_history_non_increasing() {
        let c = census();
        let config = HillClimbingConfig::default().with_max_iterations(300).with_seed(7);
        let result = HillClimbingRunner::run(&problem(&c, ShiftPolicy::Unique), &config).unwrap();
        assert_eq!(result.fitness_history.len(), result.iterations + 1);
        for w in result.fitness_history.windows(2) {
            assert!(w[1] <= w[0], "history increased: {} -> {}", w[0], w[1]);
        }
        assert!(result.best_fitness < 44.0);
        assert_eq!(result.best.population().len(), 20);
    }

    #[test]
    fn test_threshold_stops_early() {
        let config = HillClimbingConfig::default()
            .with_max_iterations(10_000)
            .with_fitness_threshold(100.0)
            .with_seed(1);
        let result = HillClimbingRunner::run(&Parabola { start: -60 }, &config).unwrap();
        assert!(result.reached_threshold);
        assert!(result.best_fitness <= 100.0);
        assert!(result.iterations < 10_000);
    }

    #[test]
    fn test_already_at_threshold() {
        let config = HillClimbingConfig::default().with_seed(1);
        let result = HillClimbingRunner::run(&Parabola { start: 7 }, &config).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.reached_threshold);
    }

    #[test]
    fn test_cancellation() {
        let config = HillClimbingConfig::default().with_seed(1);
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            HillClimbingRunner::run_with_cancel(&Parabola { start: -60 }, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.best, -60);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = HillClimbingConfig::default().with_max_buffer(0);
        let err = HillClimbingRunner::run(&Parabola { start: 0 }, &config).unwrap_err();
        assert!(matches!(err, SynthError::InvalidConfig(_)));
    }
}
