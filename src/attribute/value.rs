//! Values and the closed set of value kinds.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Domain type of a value space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// Unordered categories.
    Nominal,
    /// Categories with a meaningful order (declaration order).
    Ordinal,
    /// Whole numbers.
    Integer,
    /// Real numbers.
    Continuous,
    /// Numeric intervals such as `20-24` or `75+`.
    Range,
    /// `true` / `false`.
    Boolean,
    /// Groups of values of a referent attribute.
    Aggregated,
    /// Record values mapped onto a referent attribute.
    Mapped,
}

impl ValueKind {
    /// Whether values of this kind carry an order.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            ValueKind::Ordinal | ValueKind::Integer | ValueKind::Continuous | ValueKind::Range
        )
    }
}

/// Typed payload of a value, decided by its [`ValueKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    /// Nominal and ordinal values are identified by their label only.
    Label,
    Integer(i64),
    Continuous(f64),
    /// Half-open interval `[lower, upper)`; `upper` is infinite for `75+`.
    Range {
        lower: f64,
        upper: f64,
    },
    Boolean(bool),
    /// Labels of the referent values this value stands for.
    Aggregated(Vec<String>),
    /// Labels of the referent values this record value maps to.
    Mapped(Vec<String>),
    /// The no-data sentinel.
    Empty,
}

pub(crate) const EMPTY_RANK: u32 = u32::MAX;

#[derive(Debug)]
struct ValueInner {
    attribute: Arc<str>,
    kind: ValueKind,
    rank: u32,
    label: String,
    data: ValueData,
}

/// An immutable value owned by exactly one value space.
///
/// Cloning is cheap (shared pointer). Equality and hashing use the owning
/// attribute name and the value's rank within its space, so two values are
/// equal only when they come from the same space slot.
#[derive(Clone)]
pub struct Value(Arc<ValueInner>);

impl Value {
    pub(crate) fn new(
        attribute: Arc<str>,
        kind: ValueKind,
        rank: u32,
        label: String,
        data: ValueData,
    ) -> Self {
        Value(Arc::new(ValueInner {
            attribute,
            kind,
            rank,
            label,
            data,
        }))
    }

    /// Name of the attribute whose space owns this value.
    pub fn attribute_name(&self) -> &str {
        &self.0.attribute
    }

    pub fn kind(&self) -> ValueKind {
        self.0.kind
    }

    /// Position of the value in its space (declaration order).
    pub fn rank(&self) -> u32 {
        self.0.rank
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    pub fn data(&self) -> &ValueData {
        &self.0.data
    }

    /// Whether this is the no-data sentinel of its space.
    pub fn is_empty(&self) -> bool {
        self.0.rank == EMPTY_RANK
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Ranges report their lower bound.
    pub fn as_f64(&self) -> Option<f64> {
        match self.0.data {
            ValueData::Integer(i) => Some(i as f64),
            ValueData::Continuous(x) => Some(x),
            ValueData::Range { lower, .. } => Some(lower),
            ValueData::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Semantic comparison.
    ///
    /// Returns `None` when the values belong to different spaces, when the
    /// kind is unordered, or when either side is the empty sentinel.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.attribute_name() != other.attribute_name()
            || !self.kind().is_ordered()
            || self.is_empty()
            || other.is_empty()
        {
            return None;
        }
        match (&self.0.data, &other.0.data) {
            (ValueData::Integer(a), ValueData::Integer(b)) => Some(a.cmp(b)),
            (ValueData::Continuous(a), ValueData::Continuous(b)) => a.partial_cmp(b),
            (ValueData::Range { lower: a, .. }, ValueData::Range { lower: b, .. }) => {
                a.partial_cmp(b)
            }
            _ => Some(self.rank().cmp(&other.rank())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.0.rank == other.0.rank && self.0.attribute == other.0.attribute
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.attribute.hash(state);
        self.0.rank.hash(state);
    }
}

// Structural order used for deterministic storage, not semantic comparison.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .attribute
            .cmp(&other.0.attribute)
            .then(self.0.rank.cmp(&other.0.rank))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.label)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.0.attribute, self.0.label)
    }
}
