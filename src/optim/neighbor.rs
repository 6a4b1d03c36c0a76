//! Shift neighborhoods over a population and its sample.

use std::collections::HashMap;

use rand::Rng;
use u_numflow::random::shuffle;

use crate::attribute::{Attribute, Value};
use crate::entity::{Entity, EntityId, Population};
use crate::error::Result;
use crate::matrix::Coordinate;

/// What a shift does with a sample entity the population already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShiftPolicy {
    /// Add a duplicate (fresh identity) so no object is held twice.
    #[default]
    Unique,
    /// Add the sample entity itself, even if already held.
    Duplicate,
}

/// Generates neighbors by shifting entities.
///
/// A shift on value `v` removes an entity E1 holding `v` and adds a sample
/// entity E2 that agrees with E1 on every other attribute but holds a
/// different value of `v`'s attribute. The population size never changes.
#[derive(Debug, Clone)]
pub struct PopulationNeighborSearch {
    policy: ShiftPolicy,
    index: HashMap<(Attribute, Coordinate), Vec<Entity>>,
}

impl PopulationNeighborSearch {
    /// Indexes `sample` by (attribute, values of all other attributes).
    pub fn new(sample: &Population, policy: ShiftPolicy) -> Self {
        let mut index: HashMap<(Attribute, Coordinate), Vec<Entity>> = HashMap::new();
        for entity in sample.iter() {
            let profile = entity.full_coordinate();
            for (attribute, value) in entity.values() {
                if value.is_empty() {
                    continue;
                }
                index
                    .entry((attribute.clone(), profile.without(attribute.name())))
                    .or_default()
                    .push(entity.clone());
            }
        }
        Self { policy, index }
    }

    pub fn policy(&self) -> ShiftPolicy {
        self.policy
    }

    /// Sample entities that differ from `entity` exactly on `attribute`.
    pub fn alternatives<'a>(
        &'a self,
        entity: &Entity,
        attribute: &Attribute,
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        let current = entity.value_of(attribute).cloned();
        let attribute_key = attribute.clone();
        self.index
            .get(&(attribute.clone(), entity.full_coordinate().without(attribute.name())))
            .into_iter()
            .flatten()
            .filter(move |e| e.value_of(&attribute_key) != current.as_ref())
    }

    /// Performs one shift on `value`.
    ///
    /// Returns `false` (population untouched) when no holder of `value`
    /// has an alternative in the sample.
    pub fn shift_value<R: Rng>(&self, population: &mut Population, value: &Value, rng: &mut R) -> Result<bool> {
        let candidates: Vec<(EntityId, Vec<&Entity>)> = population
            .holding(value)
            .filter_map(|holder| {
                let attribute = holder
                    .values()
                    .find(|(_, v)| *v == value)
                    .map(|(a, _)| a)?;
                let options: Vec<&Entity> = self.alternatives(holder, attribute).collect();
                (!options.is_empty()).then(|| (holder.id(), options))
            })
            .collect();
        if candidates.is_empty() {
            return Ok(false);
        }
        let (removed, options) = &candidates[rng.random_range(0..candidates.len())];
        let chosen = options[rng.random_range(0..options.len())];
        let added = match self.policy {
            ShiftPolicy::Unique if population.contains(chosen.id()) => chosen.duplicate(),
            _ => chosen.clone(),
        };
        population.replace(*removed, added)?;
        Ok(true)
    }

    /// One shift on a random held value that admits one.
    fn random_shift<R: Rng>(&self, population: &mut Population, rng: &mut R) -> Result<bool> {
        let mut values: Vec<Value> = population.held_values().into_iter().collect();
        shuffle(&mut values, rng);
        for value in &values {
            if self.shift_value(population, value, rng)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Copy of `population` with up to `buffer` random shifts applied, or
    /// `None` when not even one shift is possible.
    pub fn neighbor<R: Rng>(&self, population: &Population, buffer: usize, rng: &mut R) -> Result<Option<Population>> {
        let mut next = population.clone();
        let mut shifted = 0;
        for _ in 0..buffer.max(1) {
            if !self.random_shift(&mut next, rng)? {
                break;
            }
            shifted += 1;
        }
        Ok((shifted > 0).then_some(next))
    }

    /// One neighbor per held value that admits a shift, each widened by
    /// `buffer - 1` further random shifts.
    pub fn neighborhood<R: Rng>(&self, population: &Population, buffer: usize, rng: &mut R) -> Result<Vec<Population>> {
        let mut neighbors = Vec::new();
        for value in population.held_values() {
            let mut next = population.clone();
            if !self.shift_value(&mut next, &value, rng)? {
                continue;
            }
            for _ in 1..buffer.max(1) {
                if !self.random_shift(&mut next, rng)? {
                    break;
                }
            }
            neighbors.push(next);
        }
        Ok(neighbors)
    }
}
