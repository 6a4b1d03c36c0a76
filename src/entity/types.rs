//! Synthetic or sampled individuals.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::attribute::{Attribute, Value};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an entity object.
///
/// Two handles with the same id are the same object; [`Entity::duplicate`]
/// is the only way to obtain an equal-valued entity with a fresh identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn fresh() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        EntityId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One value per attribute plus an optional sampling weight.
///
/// An entity's values never change after creation: [`Entity::with_value`]
/// returns a new entity. `Clone` keeps the identity (another handle on the
/// same object).
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    values: BTreeMap<Attribute, Value>,
    weight: Option<f64>,
}

impl Entity {
    /// Creates an entity from `(attribute, value)` pairs.
    ///
    /// # Errors
    /// `UnknownValue` if a value was not issued by its paired attribute.
    pub fn new<I: IntoIterator<Item = (Attribute, Value)>>(values: I) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (attribute, value) in values {
            if !attribute.owns(&value) {
                return Err(SynthError::UnknownValue {
                    attribute: attribute.name().to_string(),
                    value: value.label().to_string(),
                });
            }
            map.insert(attribute, value);
        }
        Ok(Self {
            id: EntityId::fresh(),
            values: map,
            weight: None,
        })
    }

    /// Materialises a drawn coordinate, resolving attributes in `dimensions`.
    pub fn from_coordinate(coordinate: &Coordinate, dimensions: &[Attribute]) -> Result<Self> {
        let pairs = coordinate
            .values()
            .iter()
            .map(|value| {
                dimensions
                    .iter()
                    .find(|d| d.name() == value.attribute_name())
                    .map(|d| (d.clone(), value.clone()))
                    .ok_or_else(|| SynthError::UnknownDimension {
                        attribute: value.attribute_name().to_string(),
                        matrix: "the generator's dimensions".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(pairs)
    }

    /// Sets the sampling weight of a freshly built entity.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn value_of(&self, attribute: &Attribute) -> Option<&Value> {
        self.values.get(attribute)
    }

    pub fn value_by_name(&self, attribute: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(a, _)| a.name() == attribute)
            .map(|(_, v)| v)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = (&Attribute, &Value)> {
        self.values.iter()
    }

    /// Whether the entity holds `value` for its attribute.
    pub fn has_value(&self, value: &Value) -> bool {
        self.value_by_name(value.attribute_name()) == Some(value)
    }

    /// The entity's values restricted to `dimensions`.
    ///
    /// Returns `None` when the entity lacks one of the dimensions or holds
    /// the empty sentinel for it.
    pub fn coordinate(&self, dimensions: &[Attribute]) -> Option<Coordinate> {
        let mut values = Vec::with_capacity(dimensions.len());
        for d in dimensions {
            let v = self.values.get(d)?;
            if v.is_empty() {
                return None;
            }
            values.push(v.clone());
        }
        Coordinate::new(values).ok()
    }

    /// The full coordinate of the entity's non-empty values.
    pub fn full_coordinate(&self) -> Coordinate {
        Coordinate::new(self.values.values().filter(|v| !v.is_empty()).cloned())
            .unwrap_or_default()
    }

    /// New entity with one value replaced (fresh identity).
    pub fn with_value(&self, attribute: &Attribute, value: Value) -> Result<Entity> {
        if !attribute.owns(&value) {
            return Err(SynthError::UnknownValue {
                attribute: attribute.name().to_string(),
                value: value.label().to_string(),
            });
        }
        let mut copy = self.duplicate();
        copy.values.insert(attribute.clone(), value);
        Ok(copy)
    }

    /// Equal values and weight, fresh identity.
    pub fn duplicate(&self) -> Entity {
        Entity {
            id: EntityId::fresh(),
            values: self.values.clone(),
            weight: self.weight,
        }
    }

    /// Whether both entities agree on every attribute except `attribute`.
    pub fn matches_except(&self, other: &Entity, attribute: &str) -> bool {
        let mine = self.values.iter().filter(|(a, _)| a.name() != attribute);
        let theirs = other.values.iter().filter(|(a, _)| a.name() != attribute);
        mine.eq(theirs)
    }
}
