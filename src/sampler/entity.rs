//! Weighted resampling of a finite entity sample.

use std::collections::HashSet;

use rand::Rng;

use super::alias::AliasTable;
use super::types::Sampler;
use crate::entity::{Entity, EntityId, Population};
use crate::error::{Result, SynthError};

/// Draws entities of a sample with probability proportional to their
/// weight (1 when unweighted).
///
/// [`draw`](Sampler::draw) returns another handle on the sampled entity.
/// Use [`draw_unique`](Self::draw_unique) when the drawn entities must be
/// distinct objects.
#[derive(Debug, Clone, Default)]
pub struct EntitySampler {
    table: Option<(Vec<Entity>, AliasTable)>,
}

impl EntitySampler {
    pub fn new(sample: &Population) -> Result<Self> {
        let mut sampler = Self::default();
        sampler.configure(sample)?;
        Ok(sampler)
    }

    /// # Errors
    /// `InvalidDistribution` for an empty sample or invalid weights.
    pub fn configure(&mut self, sample: &Population) -> Result<()> {
        if sample.is_empty() {
            return Err(SynthError::InvalidDistribution(
                "cannot sample from an empty population".into(),
            ));
        }
        let entities = sample.entities().to_vec();
        let weights: Vec<f64> = entities.iter().map(|e| e.weight().unwrap_or(1.0)).collect();
        let table = AliasTable::new(&weights)?;
        self.table = Some((entities, table));
        Ok(())
    }

    pub fn sample_len(&self) -> usize {
        self.table.as_ref().map_or(0, |(_, t)| t.len())
    }

    /// Draws `n` entities that are pairwise distinct objects.
    ///
    /// An entity drawn a second time is duplicated (fresh identity) instead
    /// of being returned twice.
    pub fn draw_unique<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<Entity>> {
        let mut seen: HashSet<EntityId> = HashSet::with_capacity(n);
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let entity = self.draw(rng)?;
            let entity = if seen.contains(&entity.id()) {
                entity.duplicate()
            } else {
                entity
            };
            seen.insert(entity.id());
            out.push(entity);
        }
        Ok(out)
    }
}

impl Sampler for EntitySampler {
    type Output = Entity;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Entity> {
        let (entities, table) = self
            .table
            .as_ref()
            .ok_or(SynthError::Unconfigured("EntitySampler"))?;
        Ok(entities[table.sample(rng)].clone())
    }
}
