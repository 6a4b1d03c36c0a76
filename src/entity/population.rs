//! Populations: unordered multisets of entities.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use super::types::{Entity, EntityId};
use crate::attribute::{Attribute, Value};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

/// An arena of entities with explicit add / remove transactions.
///
/// The same entity object may be held more than once (a "duplicate"
/// neighborhood re-adds a sample entity without cloning it). Removal picks
/// one occurrence by id. Iteration order is deterministic for a given
/// sequence of operations.
#[derive(Debug, Clone, Default)]
pub struct Population {
    entities: Vec<Entity>,
    positions: HashMap<EntityId, Vec<usize>>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.positions.contains_key(&id)
    }

    /// How many times the entity object is held.
    pub fn count(&self, id: EntityId) -> usize {
        self.positions.get(&id).map_or(0, Vec::len)
    }

    /// Number of distinct entity objects.
    pub fn distinct_len(&self) -> usize {
        self.positions.len()
    }

    pub fn add(&mut self, entity: Entity) {
        self.positions
            .entry(entity.id())
            .or_default()
            .push(self.entities.len());
        self.entities.push(entity);
    }

    /// Removes one occurrence of the entity.
    ///
    /// # Errors
    /// `EntityNotFound` if the population does not hold it.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity> {
        let slots = self
            .positions
            .get_mut(&id)
            .ok_or(SynthError::EntityNotFound(id))?;
        let Some(at) = slots.pop() else {
            return Err(SynthError::EntityNotFound(id));
        };
        if slots.is_empty() {
            self.positions.remove(&id);
        }
        let last = self.entities.len() - 1;
        let removed = self.entities.swap_remove(at);
        if at != last {
            let moved = self.entities[at].id();
            if let Some(slot) = self
                .positions
                .get_mut(&moved)
                .and_then(|s| s.iter_mut().find(|p| **p == last))
            {
                *slot = at;
            }
        }
        Ok(removed)
    }

    /// Removes `old` and adds `new` as one transaction.
    ///
    /// Nothing changes unless the removal is possible.
    pub fn replace(&mut self, old: EntityId, new: Entity) -> Result<Entity> {
        if !self.contains(old) {
            return Err(SynthError::EntityNotFound(old));
        }
        let removed = self.remove(old)?;
        self.add(new);
        Ok(removed)
    }

    /// Union of the members' attributes.
    pub fn attributes(&self) -> BTreeSet<Attribute> {
        self.entities
            .iter()
            .flat_map(|e| e.attributes().cloned())
            .collect()
    }

    /// Entities holding `value`.
    pub fn holding<'a>(&'a self, value: &'a Value) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.has_value(value))
    }

    /// Distinct values held by the members, in ascending order.
    pub fn held_values(&self) -> BTreeSet<Value> {
        self.entities
            .iter()
            .flat_map(|e| e.values().map(|(_, v)| v.clone()))
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Order-independent hash of the entity multiset.
    pub fn fingerprint(&self) -> u64 {
        let mut ids: Vec<EntityId> = self.entities.iter().map(Entity::id).collect();
        ids.sort_unstable();
        let mut hasher = DefaultHasher::new();
        ids.hash(&mut hasher);
        hasher.finish()
    }

    /// Order-independent hash of the members' values, ignoring identity.
    ///
    /// Two populations with the same value profiles (same number of
    /// entities per full coordinate) share this fingerprint.
    pub fn profile_fingerprint(&self) -> u64 {
        let mut profiles: Vec<Coordinate> =
            self.entities.iter().map(Entity::full_coordinate).collect();
        profiles.sort_unstable();
        let mut hasher = DefaultHasher::new();
        profiles.hash(&mut hasher);
        hasher.finish()
    }
}

impl FromIterator<Entity> for Population {
    fn from_iter<T: IntoIterator<Item = Entity>>(iter: T) -> Self {
        let mut population = Population::new();
        for entity in iter {
            population.add(entity);
        }
        population
    }
}

impl Extend<Entity> for Population {
    fn extend<T: IntoIterator<Item = Entity>>(&mut self, iter: T) {
        for entity in iter {
            self.add(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> (Attribute, Vec<Entity>) {
        let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
        let entities = (0..n)
            .map(|i| {
                let label = if i % 2 == 0 { "M" } else { "F" };
                Entity::new([(sex.clone(), sex.value_of(label).unwrap())]).unwrap()
            })
            .collect();
        (sex, entities)
    }

    #[test]
    fn test_add_remove() {
        let (_, entities) = sample(4);
        let mut pop: Population = entities.iter().cloned().collect();
        assert_eq!(pop.len(), 4);
        let removed = pop.remove(entities[0].id()).unwrap();
        assert_eq!(removed.id(), entities[0].id());
        assert_eq!(pop.len(), 3);
        assert!(!pop.contains(entities[0].id()));
        // positions still valid after swap_remove
        for e in &entities[1..] {
            assert_eq!(pop.remove(e.id()).unwrap().id(), e.id());
        }
        assert!(pop.is_empty());
    }

    #[test]
    fn test_remove_absent_is_usage_error() {
        let (_, entities) = sample(2);
        let mut pop = Population::new();
        pop.add(entities[0].clone());
        let err = pop.remove(entities[1].id()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_duplicates_held() {
        let (_, entities) = sample(2);
        let mut pop = Population::new();
        pop.add(entities[0].clone());
        pop.add(entities[0].clone());
        pop.add(entities[1].clone());
        assert_eq!(pop.count(entities[0].id()), 2);
        assert_eq!(pop.distinct_len(), 2);
        pop.remove(entities[0].id()).unwrap();
        assert_eq!(pop.count(entities[0].id()), 1);
        pop.remove(entities[0].id()).unwrap();
        assert!(!pop.contains(entities[0].id()));
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_replace_is_transactional() {
        let (_, entities) = sample(3);
        let mut pop: Population = entities[..2].iter().cloned().collect();
        let before = pop.fingerprint();
        let err = pop.replace(entities[2].id(), entities[0].clone()).unwrap_err();
        assert!(matches!(err, SynthError::EntityNotFound(_)));
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.fingerprint(), before);

        pop.replace(entities[0].id(), entities[2].clone()).unwrap();
        assert!(pop.contains(entities[2].id()));
        assert!(!pop.contains(entities[0].id()));
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let (_, entities) = sample(3);
        let a: Population = entities.iter().cloned().collect();
        let b: Population = entities.iter().rev().cloned().collect();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_profile_fingerprint_ignores_identity() {
        let (_, entities) = sample(3);
        let a: Population = entities.iter().cloned().collect();
        let b: Population = entities.iter().map(Entity::duplicate).collect();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.profile_fingerprint(), b.profile_fingerprint());

        let c: Population = entities[..2].iter().cloned().collect();
        assert_ne!(a.profile_fingerprint(), c.profile_fingerprint());
    }

    #[test]
    fn test_holding_and_values() {
        let (sex, entities) = sample(5);
        let pop: Population = entities.into_iter().collect();
        let m = sex.value_of("M").unwrap();
        assert_eq!(pop.holding(&m).count(), 3);
        assert_eq!(pop.held_values().len(), 2);
        assert_eq!(pop.attributes().len(), 1);
    }
}
