//! Several population layers optimized as one solution.
//!
//! Used when entities are nested (households holding individuals): each
//! layer has its own sample, objectives and neighborhood, and the runners
//! see the mean of the layer fitnesses.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rand::Rng;

use super::problem::PopulationProblem;
use super::types::{SearchProblem, Solution};
use crate::error::{Result, SynthError};

/// One [`Solution`] per named layer.
#[derive(Debug, Clone, Default)]
pub struct MultiLayerSolution {
    layers: BTreeMap<String, Solution>,
}

impl MultiLayerSolution {
    pub fn layer(&self, name: &str) -> Option<&Solution> {
        self.layers.get(name)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&str, &Solution)> {
        self.layers.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn with_layer(&self, name: &str, solution: Solution) -> Self {
        let mut next = self.clone();
        next.layers.insert(name.to_string(), solution);
        next
    }
}

/// Named [`PopulationProblem`]s sharing one accept/reject decision.
#[derive(Debug, Clone, Default)]
pub struct MultiLayerProblem {
    layers: BTreeMap<String, PopulationProblem>,
}

impl MultiLayerProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, name: &str, problem: PopulationProblem) -> Self {
        self.layers.insert(name.to_string(), problem);
        self
    }

    pub fn layer(&self, name: &str) -> Option<&PopulationProblem> {
        self.layers.get(name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn solution_layer<'a>(&self, solution: &'a MultiLayerSolution, name: &str) -> Result<&'a Solution> {
        solution
            .layer(name)
            .ok_or_else(|| SynthError::Usage(format!("solution has no layer '{name}'")))
    }

    /// Fitness of each layer, by layer name.
    pub fn layer_fitness(&self, solution: &MultiLayerSolution) -> Result<BTreeMap<String, f64>> {
        self.layers
            .iter()
            .map(|(name, problem)| {
                let layer = self.solution_layer(solution, name)?;
                Ok((name.clone(), problem.fitness(layer)?))
            })
            .collect()
    }
}

impl SearchProblem for MultiLayerProblem {
    type Solution = MultiLayerSolution;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Result<MultiLayerSolution> {
        if self.layers.is_empty() {
            return Err(SynthError::Usage("multi-layer problem has no layers".into()));
        }
        let mut layers = BTreeMap::new();
        for (name, problem) in &self.layers {
            layers.insert(name.clone(), problem.initial_solution(rng)?);
        }
        Ok(MultiLayerSolution { layers })
    }

    /// Mean of the layer fitnesses.
    fn fitness(&self, solution: &MultiLayerSolution) -> Result<f64> {
        let per_layer = self.layer_fitness(solution)?;
        if per_layer.is_empty() {
            return Err(SynthError::Usage("multi-layer problem has no layers".into()));
        }
        Ok(per_layer.values().sum::<f64>() / per_layer.len() as f64)
    }

    /// Perturbs one random layer; other layers are tried if it admits no
    /// move.
    fn neighbor<R: Rng>(
        &self,
        solution: &MultiLayerSolution,
        buffer: usize,
        rng: &mut R,
    ) -> Result<Option<MultiLayerSolution>> {
        let names: Vec<&String> = self.layers.keys().collect();
        if names.is_empty() {
            return Ok(None);
        }
        let start = rng.random_range(0..names.len());
        for offset in 0..names.len() {
            let name = names[(start + offset) % names.len()];
            let layer = self.solution_layer(solution, name)?;
            if let Some(next) = self.layers[name].neighbor(layer, buffer, rng)? {
                return Ok(Some(solution.with_layer(name, next)));
            }
        }
        Ok(None)
    }

    fn neighborhood<R: Rng>(
        &self,
        solution: &MultiLayerSolution,
        buffer: usize,
        rng: &mut R,
    ) -> Result<Vec<MultiLayerSolution>> {
        let mut neighbors = Vec::new();
        for (name, problem) in &self.layers {
            let layer = self.solution_layer(solution, name)?;
            for next in problem.neighborhood(layer, buffer, rng)? {
                neighbors.push(solution.with_layer(name, next));
            }
        }
        Ok(neighbors)
    }

    fn fingerprint(&self, solution: &MultiLayerSolution) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (name, layer) in &solution.layers {
            name.hash(&mut hasher);
            layer.population().profile_fingerprint().hash(&mut hasher);
        }
        hasher.finish()
    }
}
