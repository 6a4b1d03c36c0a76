//! Population generation.
//!
//! A [`PopulationGenerator`] drives any [`Sampler`] whose draws can become
//! entities: coordinates (materialised into fresh entities) or sample
//! entities (resampled micro-data).

use std::collections::HashSet;

use log::info;
use rand::Rng;
use u_numflow::random::create_rng;

use crate::attribute::Attribute;
use crate::distribution::HierarchicalHypothesis;
use crate::entity::{Entity, EntityId, Population};
use crate::error::Result;
use crate::matrix::{Coordinate, MatrixView};
use crate::sampler::{
    CoordinateSampler, EntitySampler, HierarchicalSampler, Sampler, SamplerKind,
};

/// Draw outputs that can be turned into population members.
pub trait IntoEntity {
    fn into_entity(self, dimensions: &[Attribute]) -> Result<Entity>;
}

impl IntoEntity for Coordinate {
    fn into_entity(self, dimensions: &[Attribute]) -> Result<Entity> {
        Entity::from_coordinate(&self, dimensions)
    }
}

impl IntoEntity for Entity {
    fn into_entity(self, _dimensions: &[Attribute]) -> Result<Entity> {
        Ok(self)
    }
}

/// Builds populations of a target size from a sampler.
///
/// Every generated population holds distinct entity objects: a sample
/// entity drawn twice is duplicated rather than aliased.
///
/// # Examples
///
/// ```
/// use u_synthpop::attribute::Attribute;
/// use u_synthpop::generator::PopulationGenerator;
/// use u_synthpop::matrix::{Coordinate, NDimensionalMatrix};
/// use u_synthpop::sampler::SamplerKind;
///
/// let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
/// let mut m = NDimensionalMatrix::contingency("sex", vec![sex.clone()]);
/// m.add_value(&Coordinate::of(&[(&sex, "M")]).unwrap(), 1.0).unwrap();
/// m.add_value(&Coordinate::of(&[(&sex, "F")]).unwrap(), 1.0).unwrap();
///
/// let generator = PopulationGenerator::from_view(&m, SamplerKind::Alias).unwrap();
/// let population = generator.generate_seeded(100, 42).unwrap();
/// assert_eq!(population.len(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct PopulationGenerator<S> {
    sampler: S,
    dimensions: Vec<Attribute>,
}

impl<S> PopulationGenerator<S>
where
    S: Sampler,
    S::Output: IntoEntity,
{
    pub fn new(sampler: S, dimensions: Vec<Attribute>) -> Self {
        Self {
            sampler,
            dimensions,
        }
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    /// Draws `target` entities.
    pub fn generate<R: Rng>(&self, target: usize, rng: &mut R) -> Result<Population> {
        let mut population = Population::with_capacity(target);
        let mut seen: HashSet<EntityId> = HashSet::with_capacity(target);
        for _ in 0..target {
            let entity = self.sampler.draw(rng)?.into_entity(&self.dimensions)?;
            let entity = if seen.contains(&entity.id()) {
                entity.duplicate()
            } else {
                entity
            };
            seen.insert(entity.id());
            population.add(entity);
        }
        info!(
            "generated population of {} entities over {} attributes",
            population.len(),
            self.dimensions.len()
        );
        Ok(population)
    }

    /// [`generate`](Self::generate) with a fresh RNG seeded by `seed`.
    pub fn generate_seeded(&self, target: usize, seed: u64) -> Result<Population> {
        let mut rng = create_rng(seed);
        self.generate(target, &mut rng)
    }
}

impl PopulationGenerator<CoordinateSampler> {
    /// Generator over the support of a joint distribution.
    pub fn from_view<M: MatrixView + ?Sized>(view: &M, kind: SamplerKind) -> Result<Self> {
        let sampler = kind.from_view(view)?;
        Ok(Self::new(sampler, view.dimensions().to_vec()))
    }
}

impl PopulationGenerator<HierarchicalSampler> {
    pub fn hierarchical(hypothesis: &HierarchicalHypothesis, kind: SamplerKind) -> Result<Self> {
        let sampler = HierarchicalSampler::new(hypothesis, kind)?;
        let dimensions = sampler.dimensions().to_vec();
        Ok(Self::new(sampler, dimensions))
    }
}

impl PopulationGenerator<EntitySampler> {
    /// Weighted resampling of a micro-data sample.
    pub fn from_sample(sample: &Population) -> Result<Self> {
        let sampler = EntitySampler::new(sample)?;
        Ok(Self::new(sampler, sample.attributes().into_iter().collect()))
    }
}
