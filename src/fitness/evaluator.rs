//! Fitness of a population against a set of objective matrices.

use super::indicator::Indicator;
use crate::entity::Population;
use crate::error::{Result, SynthError};
use crate::matrix::NDimensionalMatrix;

/// Sums one indicator over several objective matrices.
///
/// Objectives are read-only during evaluation; with the `parallel` feature
/// they are evaluated concurrently.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    objectives: Vec<NDimensionalMatrix>,
    indicator: Indicator,
}

impl FitnessEvaluator {
    /// # Errors
    /// `Usage` when no objective is given.
    pub fn new(objectives: Vec<NDimensionalMatrix>, indicator: Indicator) -> Result<Self> {
        if objectives.is_empty() {
            return Err(SynthError::Usage(
                "fitness evaluation needs at least one objective".into(),
            ));
        }
        Ok(Self {
            objectives,
            indicator,
        })
    }

    pub fn objectives(&self) -> &[NDimensionalMatrix] {
        &self.objectives
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// Indicator value per objective, in objective order.
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_each(&self, population: &Population) -> Result<Vec<f64>> {
        self.objectives
            .iter()
            .map(|o| self.indicator.evaluate_population(o, population))
            .collect()
    }

    /// Indicator value per objective, in objective order.
    #[cfg(feature = "parallel")]
    pub fn evaluate_each(&self, population: &Population) -> Result<Vec<f64>> {
        use rayon::prelude::*;

        self.objectives
            .par_iter()
            .map(|o| self.indicator.evaluate_population(o, population))
            .collect()
    }

    /// Total fitness; lower is better.
    pub fn evaluate(&self, population: &Population) -> Result<f64> {
        Ok(self.evaluate_each(population)?.iter().sum())
    }
}
