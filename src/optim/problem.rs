//! Single-layer population fitting problem.

use std::sync::Arc;

use rand::Rng;

use super::neighbor::{PopulationNeighborSearch, ShiftPolicy};
use super::types::{SearchProblem, Solution};
use crate::entity::Population;
use crate::error::Result;
use crate::fitness::FitnessEvaluator;

/// Fits a population to objective matrices by shifting entities against a
/// sample pool.
///
/// The initial population is copied into every run; the caller's
/// population and the sample are never mutated.
#[derive(Debug, Clone)]
pub struct PopulationProblem {
    initial: Population,
    sample: Arc<Population>,
    evaluator: Arc<FitnessEvaluator>,
    search: PopulationNeighborSearch,
}

impl PopulationProblem {
    pub fn new(initial: Population, sample: Population, evaluator: FitnessEvaluator, policy: ShiftPolicy) -> Self {
        let search = PopulationNeighborSearch::new(&sample, policy);
        Self {
            initial,
            sample: Arc::new(sample),
            evaluator: Arc::new(evaluator),
            search,
        }
    }

    pub fn initial(&self) -> &Population {
        &self.initial
    }

    pub fn sample(&self) -> &Arc<Population> {
        &self.sample
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn search(&self) -> &PopulationNeighborSearch {
        &self.search
    }

    fn wrap(&self, population: Population) -> Solution {
        Solution::new(population, Arc::clone(&self.sample), Arc::clone(&self.evaluator))
    }
}

impl SearchProblem for PopulationProblem {
    type Solution = Solution;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> Result<Solution> {
        Ok(self.wrap(self.initial.clone()))
    }

    fn fitness(&self, solution: &Solution) -> Result<f64> {
        solution.fitness_against(&self.evaluator)
    }

    fn neighbor<R: Rng>(&self, solution: &Solution, buffer: usize, rng: &mut R) -> Result<Option<Solution>> {
        Ok(self
            .search
            .neighbor(solution.population(), buffer, rng)?
            .map(|p| self.wrap(p)))
    }

    fn neighborhood<R: Rng>(&self, solution: &Solution, buffer: usize, rng: &mut R) -> Result<Vec<Solution>> {
        Ok(self
            .search
            .neighborhood(solution.population(), buffer, rng)?
            .into_iter()
            .map(|p| self.wrap(p))
            .collect())
    }

    fn fingerprint(&self, solution: &Solution) -> u64 {
        solution.population().profile_fingerprint()
    }
}

/// Shared population fixtures for optimizer tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::attribute::Attribute;
    use crate::entity::Entity;
    use crate::fitness::Indicator;
    use crate::matrix::{Coordinate, NDimensionalMatrix};

    pub(crate) struct Census {
        pub sex: Attribute,
        pub age: Attribute,
    }

    pub(crate) fn census() -> Census {
        Census {
            sex: Attribute::nominal("Sex", &["M", "F"]).unwrap(),
            age: Attribute::ordinal("Age", &["young", "old"]).unwrap(),
        }
    }

    pub(crate) fn person(c: &Census, s: &str, a: &str) -> Entity {
        Entity::new([
            (c.sex.clone(), c.sex.value_of(s).unwrap()),
            (c.age.clone(), c.age.value_of(a).unwrap()),
        ])
        .unwrap()
    }

    /// Twenty M/young entities fitted towards a 10/10 sex split and a
    /// 8/12 age split, with one sample entity per cell.
    pub(crate) fn problem(c: &Census, policy: ShiftPolicy) -> PopulationProblem {
        let initial: Population = (0..20).map(|_| person(c, "M", "young")).collect();
        let sample: Population = [("M", "young"), ("M", "old"), ("F", "young"), ("F", "old")]
            .iter()
            .map(|(s, a)| person(c, s, a))
            .collect();

        let mut by_sex = NDimensionalMatrix::contingency("sex", vec![c.sex.clone()]);
        by_sex.add_value(&Coordinate::of(&[(&c.sex, "M")]).unwrap(), 10.0).unwrap();
        by_sex.add_value(&Coordinate::of(&[(&c.sex, "F")]).unwrap(), 10.0).unwrap();
        let mut by_age = NDimensionalMatrix::contingency("age", vec![c.age.clone()]);
        by_age.add_value(&Coordinate::of(&[(&c.age, "young")]).unwrap(), 8.0).unwrap();
        by_age.add_value(&Coordinate::of(&[(&c.age, "old")]).unwrap(), 12.0).unwrap();

        let evaluator = FitnessEvaluator::new(vec![by_sex, by_age], Indicator::Tae).unwrap();
        PopulationProblem::new(initial, sample, evaluator, policy)
    }
}
