//! Simulated Annealing loop over a [`SearchProblem`].

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info};
use rand::Rng;
use u_numflow::random::create_rng;

use super::config::{CoolingSchedule, SaConfig};
use crate::error::{Result, SynthError};
use crate::optim::types::{adaptive_buffer, is_cancelled, SearchProblem};

/// Outcome of an annealing run.
///
/// `best` is the lowest-fitness solution ever visited, which may differ
/// from the solution the walk ended on.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone> {
    pub best: S,
    pub best_fitness: f64,

    /// Neighbors evaluated.
    pub iterations: usize,

    /// Best fitness before the first iteration and after each one.
    pub fitness_history: Vec<f64>,

    /// Temperature at exit.
    pub final_temperature: f64,

    /// Moves taken, uphill ones included.
    pub accepted_moves: usize,

    /// Moves that lowered the current fitness.
    pub improving_moves: usize,

    pub cancelled: bool,
    pub reached_threshold: bool,
}

/// Executes Simulated Annealing over a [`SearchProblem`].
pub struct SaRunner;

impl SaRunner {
    pub fn run<P: SearchProblem>(problem: &P, config: &SaConfig) -> Result<SaResult<P::Solution>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs SA with an optional cancellation token, checked once per
    /// iteration.
    pub fn run_with_cancel<P: SearchProblem>(
        problem: &P,
        config: &SaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult<P::Solution>> {
        config.validate().map_err(SynthError::InvalidConfig)?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let mut current = problem.initial_solution(&mut rng)?;
        let mut current_fitness = problem.fitness(&current)?;
        let initial_fitness = current_fitness;
        let mut best = current.clone();
        let mut best_fitness = current_fitness;

        let mut temperature = config.initial_temperature;
        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cancelled = false;
        let mut stalled = false;
        let mut reached_threshold = best_fitness <= config.fitness_threshold;
        let mut fitness_history = vec![best_fitness];

        let linear_steps = (config.max_iterations / config.iterations_per_temperature).max(1);
        let mut step = 0usize;

        'cooling: while temperature > config.min_temperature
            && !reached_threshold
            && iterations < config.max_iterations
        {
            let inner = match config.cooling {
                CoolingSchedule::LundyMees { .. } => 1,
                _ => config.iterations_per_temperature,
            };

            for _ in 0..inner {
                if iterations >= config.max_iterations || reached_threshold {
                    break;
                }
                if is_cancelled(&cancel) {
                    cancelled = true;
                    break 'cooling;
                }

                let buffer = adaptive_buffer(config.max_buffer, current_fitness, initial_fitness);
                let Some(neighbor) = problem.neighbor(&current, buffer, &mut rng)? else {
                    stalled = true;
                    break 'cooling;
                };
                let neighbor_fitness = problem.fitness(&neighbor)?;
                let delta = neighbor_fitness - current_fitness;

                // Metropolis: downhill always, uphill with exp(-delta / T)
                let accept = if delta < 0.0 {
                    improving_moves += 1;
                    true
                } else {
                    rng.random_range(0.0..1.0) < (-delta / temperature).exp()
                };

                if accept {
                    current = neighbor;
                    current_fitness = neighbor_fitness;
                    accepted_moves += 1;
                    if current_fitness < best_fitness {
                        best = current.clone();
                        best_fitness = current_fitness;
                    }
                }

                iterations += 1;
                fitness_history.push(best_fitness);
                reached_threshold = best_fitness <= config.fitness_threshold;
            }

            temperature = cool(temperature, config, step, linear_steps);
            step += 1;
            debug!(
                "annealing: step {step}, T={temperature:.6}, current {current_fitness:.6}, best {best_fitness:.6}"
            );
        }

        if stalled {
            debug!("annealing: no neighbor at iteration {iterations}, stopping");
        }
        info!(
            "annealing finished: {iterations} iterations, best fitness {best_fitness:.6}, {accepted_moves} accepted ({improving_moves} improving), final T={temperature:.6}"
        );

        Ok(SaResult {
            best,
            best_fitness,
            iterations,
            fitness_history,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            cancelled,
            reached_threshold,
        })
    }
}

/// Next temperature under the configured schedule.
fn cool(temperature: f64, config: &SaConfig, step: usize, linear_steps: usize) -> f64 {
    match config.cooling {
        CoolingSchedule::Geometric { alpha } => temperature * alpha,
        CoolingSchedule::Linear => {
            let t = config.initial_temperature
                - (step + 1) as f64 * (config.initial_temperature - config.min_temperature)
                    / linear_steps as f64;
            t.max(config.min_temperature)
        }
        CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
    }
}
