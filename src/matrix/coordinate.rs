//! Coordinates: sets of attribute values addressing matrix cells.

use std::fmt;

use crate::attribute::{Attribute, Value};
use crate::error::{Result, SynthError};

/// An unordered set of values with at most one value per attribute.
///
/// Values are kept sorted by attribute name, so equality, hashing and
/// ordering do not depend on insertion order. A coordinate that names only
/// some of a matrix's dimensions is a marginal query.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    values: Vec<Value>,
}

impl Coordinate {
    /// Builds a coordinate from values.
    ///
    /// # Errors
    /// `Usage` if two values belong to the same attribute.
    pub fn new<I: IntoIterator<Item = Value>>(values: I) -> Result<Self> {
        let mut values: Vec<Value> = values.into_iter().collect();
        values.sort();
        if let Some(w) = values
            .windows(2)
            .find(|w| w[0].attribute_name() == w[1].attribute_name())
        {
            return Err(SynthError::Usage(format!(
                "coordinate repeats attribute '{}'",
                w[0].attribute_name()
            )));
        }
        Ok(Self { values })
    }

    /// Builds a coordinate from `(attribute, label)` pairs.
    pub fn of(pairs: &[(&Attribute, &str)]) -> Result<Self> {
        let values = pairs
            .iter()
            .map(|(attribute, label)| attribute.value_of(label))
            .collect::<Result<Vec<_>>>()?;
        Self::new(values)
    }

    fn from_sorted(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of the attributes this coordinate constrains.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.attribute_name())
    }

    pub fn value_of(&self, attribute: &str) -> Option<&Value> {
        self.values
            .binary_search_by(|v| v.attribute_name().cmp(attribute))
            .ok()
            .map(|i| &self.values[i])
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.value_of(attribute).is_some()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.binary_search(value).is_ok()
    }

    /// Whether every value of `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &Coordinate) -> bool {
        self.values.iter().all(|v| other.contains(v))
    }

    /// Restricts the coordinate to the given attributes.
    pub fn project(&self, dimensions: &[Attribute]) -> Coordinate {
        Self::from_sorted(
            self.values
                .iter()
                .filter(|v| dimensions.iter().any(|d| d.name() == v.attribute_name()))
                .cloned()
                .collect(),
        )
    }

    /// Removes the value of one attribute, if present.
    pub fn without(&self, attribute: &str) -> Coordinate {
        Self::from_sorted(
            self.values
                .iter()
                .filter(|v| v.attribute_name() != attribute)
                .cloned()
                .collect(),
        )
    }

    /// Returns a copy with `value` set for its attribute.
    pub fn with_value(&self, value: Value) -> Coordinate {
        let mut values: Vec<Value> = self
            .values
            .iter()
            .filter(|v| v.attribute_name() != value.attribute_name())
            .cloned()
            .collect();
        let at = values.partition_point(|v| *v < value);
        values.insert(at, value);
        Self::from_sorted(values)
    }

    /// Union of two coordinates; `None` if they disagree on an attribute.
    pub fn merge(&self, other: &Coordinate) -> Option<Coordinate> {
        let mut values = self.values.clone();
        for v in &other.values {
            match self.value_of(v.attribute_name()) {
                Some(existing) if existing != v => return None,
                Some(_) => {}
                None => values.push(v.clone()),
            }
        }
        values.sort();
        Some(Self::from_sorted(values))
    }

    /// Every full coordinate over `dimensions` (cartesian product).
    ///
    /// An empty dimension list yields the single empty coordinate.
    pub fn enumerate(dimensions: &[Attribute]) -> Vec<Coordinate> {
        let mut acc = vec![Coordinate::default()];
        for attribute in dimensions {
            let mut next = Vec::with_capacity(acc.len() * attribute.values().len());
            for coordinate in &acc {
                for value in attribute.values() {
                    next.push(coordinate.with_value(value.clone()));
                }
            }
            acc = next;
        }
        acc
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.iter()).finish()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:?}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> (Attribute, Attribute) {
        (
            Attribute::nominal("Sex", &["M", "F"]).unwrap(),
            Attribute::ordinal("Age", &["young", "old"]).unwrap(),
        )
    }

    #[test]
    fn test_order_independent_equality() {
        let (sex, age) = attrs();
        let a = Coordinate::of(&[(&sex, "M"), (&age, "young")]).unwrap();
        let b = Coordinate::of(&[(&age, "young"), (&sex, "M")]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_attribute_rejected() {
        let (sex, _) = attrs();
        let err = Coordinate::of(&[(&sex, "M"), (&sex, "F")]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_subset_and_project() {
        let (sex, age) = attrs();
        let full = Coordinate::of(&[(&sex, "F"), (&age, "old")]).unwrap();
        let partial = Coordinate::of(&[(&sex, "F")]).unwrap();
        assert!(partial.is_subset_of(&full));
        assert!(!full.is_subset_of(&partial));
        assert_eq!(full.project(std::slice::from_ref(&sex)), partial);
        assert_eq!(full.without("Age"), partial);
    }

    #[test]
    fn test_with_value_replaces() {
        let (sex, age) = attrs();
        let c = Coordinate::of(&[(&sex, "F"), (&age, "old")]).unwrap();
        let d = c.with_value(sex.value_of("M").unwrap());
        assert_eq!(d.value_of("Sex").unwrap().label(), "M");
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_merge() {
        let (sex, age) = attrs();
        let a = Coordinate::of(&[(&sex, "F")]).unwrap();
        let b = Coordinate::of(&[(&age, "old")]).unwrap();
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.len(), 2);
        let conflict = Coordinate::of(&[(&sex, "M")]).unwrap();
        assert!(a.merge(&conflict).is_none());
        assert_eq!(a.merge(&a).unwrap(), a);
    }

    #[test]
    fn test_enumerate() {
        let (sex, age) = attrs();
        let all = Coordinate::enumerate(&[sex, age]);
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|c| c.len() == 2));
        assert_eq!(Coordinate::enumerate(&[]).len(), 1);
    }

    #[test]
    fn test_display() {
        let (sex, age) = attrs();
        let c = Coordinate::of(&[(&sex, "F"), (&age, "old")]).unwrap();
        assert_eq!(c.to_string(), "[Age=old, Sex=F]");
    }
}
