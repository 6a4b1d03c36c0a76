//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Start from the problem's initial solution
//! 2. At each iteration:
//!    a. Generate the neighborhood of the current solution
//!    b. Move to the best neighbor whose fingerprint is not tabu, even if
//!       it is worse
//!    c. Remember its fingerprint in the FIFO tabu list
//!    d. Update the global best if improved
//!    e. After `stall_limit` iterations without a new global best, jump
//!       to a random wide neighbor (diversification)
//! 3. Terminate after max iterations or when the threshold is reached
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info, warn};
use u_numflow::random::create_rng;

use super::config::TabuConfig;
use crate::error::{Result, SynthError};
use crate::optim::types::{is_cancelled, SearchProblem};

const LOG_EVERY: usize = 50;

/// Result of a Tabu Search run.
#[derive(Debug, Clone)]
pub struct TabuResult<S: Clone> {
    /// Best solution found.
    pub best: S,
    /// Fitness of the best solution.
    pub best_fitness: f64,
    /// Total iterations executed.
    pub iterations: usize,
    /// Iteration at which the best solution was found.
    pub best_iteration: usize,
    /// Best fitness before the first iteration and after each one.
    pub fitness_history: Vec<f64>,
    /// Number of stall-triggered diversification jumps.
    pub diversifications: usize,
    /// Whether cancelled externally.
    pub cancelled: bool,
    /// Whether the best fitness reached the threshold.
    pub reached_threshold: bool,
}

/// Bounded FIFO of visited fingerprints with O(1) lookup.
struct TabuList {
    queue: VecDeque<u64>,
    set: HashSet<u64>,
    capacity: usize,
}

impl TabuList {
    fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            set: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    fn contains(&self, fingerprint: u64) -> bool {
        self.set.contains(&fingerprint)
    }

    fn remember(&mut self, fingerprint: u64) {
        if !self.set.insert(fingerprint) {
            return;
        }
        self.queue.push_back(fingerprint);
        if self.queue.len() > self.capacity {
            if let Some(old) = self.queue.pop_front() {
                self.set.remove(&old);
            }
        }
    }
}

/// Tabu Search runner.
pub struct TabuRunner;

impl TabuRunner {
    pub fn run<P: SearchProblem>(problem: &P, config: &TabuConfig) -> Result<TabuResult<P::Solution>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs with an optional cancellation flag, checked once per iteration.
    pub fn run_with_cancel<P: SearchProblem>(
        problem: &P,
        config: &TabuConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TabuResult<P::Solution>> {
        config.validate().map_err(SynthError::InvalidConfig)?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let mut current = problem.initial_solution(&mut rng)?;
        let mut current_fitness = problem.fitness(&current)?;
        let mut best = current.clone();
        let mut best_fitness = current_fitness;
        let mut best_iteration = 0;

        let mut tabu = TabuList::new(config.max_tabu_size);
        tabu.remember(problem.fingerprint(&current));

        let mut fitness_history = vec![best_fitness];
        let mut iterations = 0usize;
        let mut no_improve = 0usize;
        let mut diversifications = 0usize;
        let mut cancelled = false;
        let mut reached_threshold = best_fitness <= config.fitness_threshold;

        while !reached_threshold && iterations < config.max_iterations {
            if is_cancelled(&cancel) {
                cancelled = true;
                break;
            }
            iterations += 1;

            // Best admissible (non-tabu) neighbor
            let mut chosen: Option<(P::Solution, f64, u64)> = None;
            for candidate in problem.neighborhood(&current, config.buffer, &mut rng)? {
                let fingerprint = problem.fingerprint(&candidate);
                if tabu.contains(fingerprint) {
                    continue;
                }
                let fitness = problem.fitness(&candidate)?;
                if chosen.as_ref().is_none_or(|(_, f, _)| fitness < *f) {
                    chosen = Some((candidate, fitness, fingerprint));
                }
            }

            match chosen {
                Some((candidate, fitness, fingerprint)) => {
                    tabu.remember(fingerprint);
                    current = candidate;
                    current_fitness = fitness;
                    if current_fitness < best_fitness {
                        best = current.clone();
                        best_fitness = current_fitness;
                        best_iteration = iterations;
                        no_improve = 0;
                    } else {
                        no_improve += 1;
                    }
                }
                None => no_improve += 1,
            }

            if no_improve >= config.stall_limit() {
                if let Some(jump) = problem.neighbor(&current, config.diversification_buffer, &mut rng)? {
                    current_fitness = problem.fitness(&jump)?;
                    tabu.remember(problem.fingerprint(&jump));
                    current = jump;
                    if current_fitness < best_fitness {
                        best = current.clone();
                        best_fitness = current_fitness;
                        best_iteration = iterations;
                    }
                }
                diversifications += 1;
                no_improve = 0;
                warn!(
                    "tabu search stalled at iteration {iterations}; diversifying (current {current_fitness:.6}, best {best_fitness:.6})"
                );
            }

            fitness_history.push(best_fitness);
            reached_threshold = best_fitness <= config.fitness_threshold;

            if iterations.is_multiple_of(LOG_EVERY) {
                debug!("tabu search: iteration {iterations}, current {current_fitness:.6}, best {best_fitness:.6}");
            }
        }

        info!(
            "tabu search finished: {iterations} iterations, best fitness {best_fitness:.6} at iteration {best_iteration}, {diversifications} diversifications"
        );

        Ok(TabuResult {
            best,
            best_fitness,
            iterations,
            best_iteration,
            fitness_history,
            diversifications,
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
    fn test_tabu_list_fifo() {
        let mut tabu = TabuList::new(2);
        tabu.remember(1);
        tabu.remember(2);
        tabu.remember(2);
        assert!(tabu.contains(1));
        tabu.remember(3);
        assert!(!tabu.contains(1));
        assert!(tabu.contains(2) && tabu.contains(3));
    }

    #[test]
    fn test_parabola_reaches_minimum() {
        let config = TabuConfig::default().with_max_iterations(200).with_seed(42);
        let result = TabuRunner::run(&Parabola { start: -30 }, &config).unwrap();
        assert_eq!(result.best, 7);
        assert!(result.reached_threshold);
        assert_eq!(result.best_iteration, result.iterations);
    }

    #[test]
    fn test_history_non_increasing() {
        let c = census();
        let config = TabuConfig::default()
            .with_max_iterations(60)
            .with_max_tabu_size(20)
            .with_seed(3);
        let result = TabuRunner::run(&problem(&c, ShiftPolicy::Unique), &config).unwrap();
        assert_eq!(result.fitness_history.len(), result.iterations + 1);
        for w in result.fitness_history.windows(2) {
            assert!(w[1] <= w[0], "history increased: {} -> {}", w[0], w[1]);
        }
        assert!(result.best_fitness < 44.0);
    }

    #[test]
    fn test_stall_triggers_diversification() {
        // at the minimum already every neighbor is worse
        let config = TabuConfig::default()
            .with_max_iterations(20)
            .with_max_tabu_size(10)
            .with_fitness_threshold(0.0)
            .with_seed(5);
        let result = TabuRunner::run(&Parabola { start: 6 }, &config).unwrap();
        // first move reaches 7 and the run stops on the threshold
        assert!(result.reached_threshold);

        // an unreachable threshold forces stalls once the minimum is found
        let stuck = TabuRunner::run(&Offset, &config).unwrap();
        assert_eq!(stuck.iterations, 20);
        assert!(stuck.diversifications > 0);
        assert_eq!(stuck.best_fitness, 1.0);
    }

    /// Parabola shifted up by one: the threshold 0 is never reached.
    struct Offset;

    impl SearchProblem for Offset {
        type Solution = i64;

        fn initial_solution<R: rand::Rng>(&self, rng: &mut R) -> Result<i64> {
            Parabola { start: 7 }.initial_solution(rng)
        }

        fn fitness(&self, x: &i64) -> Result<f64> {
            Ok(Parabola { start: 7 }.fitness(x)? + 1.0)
        }

        fn neighbor<R: rand::Rng>(&self, x: &i64, buffer: usize, rng: &mut R) -> Result<Option<i64>> {
            Parabola { start: 7 }.neighbor(x, buffer, rng)
        }

        fn neighborhood<R: rand::Rng>(&self, x: &i64, buffer: usize, rng: &mut R) -> Result<Vec<i64>> {
            Parabola { start: 7 }.neighborhood(x, buffer, rng)
        }

        fn fingerprint(&self, x: &i64) -> u64 {
            *x as u64
        }
    }

    #[test]
    fn test_cancellation() {
        let config = TabuConfig::default().with_seed(1);
        let cancel = Arc::new(AtomicBool::new(true));
        let result = TabuRunner::run_with_cancel(&Parabola { start: -30 }, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
    }
}
