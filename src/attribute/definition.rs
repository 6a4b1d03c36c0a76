//! Attribute definitions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::space::ValueSpace;
use super::value::{Value, ValueData, ValueKind};
use crate::error::{Result, SynthError};

#[derive(Debug)]
struct AttributeInner {
    space: ValueSpace,
    referent: Option<Attribute>,
}

/// A named dimension with its value space.
///
/// Cheap to clone. Identity (equality, hashing, ordering) is the name, so
/// an attribute can be used directly as a map key.
#[derive(Clone)]
pub struct Attribute(Arc<AttributeInner>);

impl Attribute {
    /// Wraps a fully built value space.
    pub fn new(space: ValueSpace) -> Self {
        Attribute(Arc::new(AttributeInner {
            space,
            referent: None,
        }))
    }

    fn with_labels(name: &str, kind: ValueKind, labels: &[&str]) -> Result<Self> {
        let mut space = ValueSpace::new(name, kind);
        for label in labels {
            space.add_value(label)?;
        }
        Ok(Self::new(space))
    }

    /// Unordered categorical attribute.
    pub fn nominal(name: &str, labels: &[&str]) -> Result<Self> {
        Self::with_labels(name, ValueKind::Nominal, labels)
    }

    /// Categorical attribute ordered by declaration.
    pub fn ordinal(name: &str, labels: &[&str]) -> Result<Self> {
        Self::with_labels(name, ValueKind::Ordinal, labels)
    }

    /// Interval attribute; labels look like `0-19`, `20-24` or `75+`.
    pub fn range(name: &str, labels: &[&str]) -> Result<Self> {
        Self::with_labels(name, ValueKind::Range, labels)
    }

    /// Whole-number attribute.
    pub fn integer<I: IntoIterator<Item = i64>>(name: &str, values: I) -> Result<Self> {
        let mut space = ValueSpace::new(name, ValueKind::Integer);
        for v in values {
            space.add_value(&v.to_string())?;
        }
        Ok(Self::new(space))
    }

    /// Real-valued attribute restricted to the given observed values.
    pub fn continuous<I: IntoIterator<Item = f64>>(name: &str, values: I) -> Result<Self> {
        let mut space = ValueSpace::new(name, ValueKind::Continuous);
        for v in values {
            space.add_value(&v.to_string())?;
        }
        Ok(Self::new(space))
    }

    /// Two-valued attribute with labels `true` and `false`.
    pub fn boolean(name: &str) -> Result<Self> {
        Self::with_labels(name, ValueKind::Boolean, &["true", "false"])
    }

    /// Attribute whose values group values of `referent`.
    ///
    /// # Errors
    /// `UnknownValue` if a group names a label the referent lacks.
    pub fn aggregated(name: &str, referent: &Attribute, groups: &[(&str, &[&str])]) -> Result<Self> {
        Self::grouped(name, ValueKind::Aggregated, referent, groups)
    }

    /// Record attribute whose values map onto values of `referent`.
    pub fn mapped(name: &str, referent: &Attribute, mapping: &[(&str, &[&str])]) -> Result<Self> {
        Self::grouped(name, ValueKind::Mapped, referent, mapping)
    }

    fn grouped(
        name: &str,
        kind: ValueKind,
        referent: &Attribute,
        groups: &[(&str, &[&str])],
    ) -> Result<Self> {
        let mut space = ValueSpace::new(name, kind);
        for (label, members) in groups {
            for member in members.iter() {
                referent.value_of(member)?;
            }
            space.add_group(label, members.iter().map(|m| m.to_string()).collect())?;
        }
        Ok(Attribute(Arc::new(AttributeInner {
            space,
            referent: Some(referent.clone()),
        })))
    }

    pub fn name(&self) -> &str {
        self.0.space.attribute_name()
    }

    pub fn kind(&self) -> ValueKind {
        self.0.space.kind()
    }

    pub fn space(&self) -> &ValueSpace {
        &self.0.space
    }

    pub fn values(&self) -> &[Value] {
        self.0.space.values()
    }

    pub fn value_of(&self, label: &str) -> Result<Value> {
        self.0.space.value_of(label)
    }

    pub fn empty_value(&self) -> &Value {
        self.0.space.empty_value()
    }

    /// Whether `value` was issued by this attribute's space.
    pub fn owns(&self, value: &Value) -> bool {
        self.0.space.contains(value)
    }

    /// The attribute that aggregated or mapped values refer to.
    pub fn referent(&self) -> Option<&Attribute> {
        self.0.referent.as_ref()
    }

    /// Resolves an aggregated or mapped value into referent values.
    ///
    /// Values of any other kind resolve to themselves.
    pub fn resolve(&self, value: &Value) -> Result<Vec<Value>> {
        if !self.owns(value) {
            return Err(SynthError::UnknownValue {
                attribute: self.name().to_string(),
                value: value.label().to_string(),
            });
        }
        match (value.data(), self.referent()) {
            (ValueData::Aggregated(members) | ValueData::Mapped(members), Some(referent)) => {
                members.iter().map(|m| referent.value_of(m)).collect()
            }
            _ => Ok(vec![value.clone()]),
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl PartialOrd for Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Attribute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}, {} values)", self.name(), self.kind(), self.values().len())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
