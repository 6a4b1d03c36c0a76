//! Value spaces: the domain of one attribute.

use std::collections::HashMap;
use std::sync::Arc;

use super::value::{Value, ValueData, ValueKind, EMPTY_RANK};
use crate::error::{Result, SynthError};

const EMPTY_LABEL: &str = "";

/// Ordered set of unique values for one attribute, plus an empty sentinel.
#[derive(Debug, Clone)]
pub struct ValueSpace {
    attribute: Arc<str>,
    kind: ValueKind,
    values: Vec<Value>,
    index: HashMap<String, usize>,
    empty: Value,
}

impl ValueSpace {
    /// Creates an empty space for the named attribute.
    pub fn new(attribute: &str, kind: ValueKind) -> Self {
        let attribute: Arc<str> = Arc::from(attribute);
        let empty = Value::new(
            attribute.clone(),
            kind,
            EMPTY_RANK,
            EMPTY_LABEL.to_string(),
            ValueData::Empty,
        );
        Self {
            attribute,
            kind,
            values: Vec::new(),
            index: HashMap::new(),
            empty,
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Adds a value parsed from `label` according to the space's kind.
    ///
    /// # Errors
    /// `DuplicateValue` if the label exists, `Usage` if it cannot be parsed
    /// for a numeric or boolean kind.
    pub fn add_value(&mut self, label: &str) -> Result<Value> {
        let data = self.parse_data(label)?;
        self.push(label, data)
    }

    /// Adds a value that stands for a group of referent labels.
    ///
    /// Only valid for `Aggregated` and `Mapped` spaces.
    pub fn add_group(&mut self, label: &str, members: Vec<String>) -> Result<Value> {
        let data = match self.kind {
            ValueKind::Aggregated => ValueData::Aggregated(members),
            ValueKind::Mapped => ValueData::Mapped(members),
            other => {
                return Err(SynthError::Usage(format!(
                    "cannot add grouped value '{label}' to a {other:?} space"
                )))
            }
        };
        self.push(label, data)
    }

    fn push(&mut self, label: &str, data: ValueData) -> Result<Value> {
        if label == EMPTY_LABEL || self.index.contains_key(label) {
            return Err(SynthError::DuplicateValue {
                attribute: self.attribute.to_string(),
                value: label.to_string(),
            });
        }
        let rank = self.values.len() as u32;
        let value = Value::new(
            self.attribute.clone(),
            self.kind,
            rank,
            label.to_string(),
            data,
        );
        self.index.insert(label.to_string(), self.values.len());
        self.values.push(value.clone());
        Ok(value)
    }

    fn parse_data(&self, label: &str) -> Result<ValueData> {
        let trimmed = label.trim();
        let invalid = || {
            SynthError::Usage(format!(
                "'{label}' is not a valid {:?} value for '{}'",
                self.kind, self.attribute
            ))
        };
        match self.kind {
            ValueKind::Nominal | ValueKind::Ordinal => Ok(ValueData::Label),
            ValueKind::Integer => trimmed
                .parse::<i64>()
                .map(ValueData::Integer)
                .map_err(|_| invalid()),
            ValueKind::Continuous => match trimmed.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(ValueData::Continuous(x)),
                _ => Err(invalid()),
            },
            ValueKind::Range => parse_range(trimmed).ok_or_else(invalid),
            ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ValueData::Boolean(true)),
                "false" | "no" | "0" => Ok(ValueData::Boolean(false)),
                _ => Err(invalid()),
            },
            ValueKind::Aggregated => Ok(ValueData::Aggregated(Vec::new())),
            ValueKind::Mapped => Ok(ValueData::Mapped(Vec::new())),
        }
    }

    /// Looks up a value by label.
    ///
    /// Numeric spaces also match labels that parse to the same number
    /// (`"05"` finds `"5"`). The empty label returns the sentinel.
    pub fn value_of(&self, label: &str) -> Result<Value> {
        if label == EMPTY_LABEL {
            return Ok(self.empty.clone());
        }
        if let Some(&i) = self.index.get(label) {
            return Ok(self.values[i].clone());
        }
        let numeric = match (self.kind, self.parse_data(label)) {
            (ValueKind::Integer | ValueKind::Continuous | ValueKind::Boolean, Ok(data)) => {
                self.values.iter().find(|v| *v.data() == data).cloned()
            }
            _ => None,
        };
        numeric.ok_or_else(|| SynthError::UnknownValue {
            attribute: self.attribute.to_string(),
            value: label.to_string(),
        })
    }

    /// Whether `value` is one of this space's values or its sentinel.
    pub fn contains(&self, value: &Value) -> bool {
        value.attribute_name() == &*self.attribute
            && (value.is_empty() || (value.rank() as usize) < self.values.len())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn empty_value(&self) -> &Value {
        &self.empty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parses `a-b`, `a+` or a single number `a` (degenerate interval).
fn parse_range(label: &str) -> Option<ValueData> {
    if let Some(lower) = label.strip_suffix('+') {
        let lower = lower.trim().parse::<f64>().ok()?;
        return Some(ValueData::Range {
            lower,
            upper: f64::INFINITY,
        });
    }
    // skip a leading sign so "-5-0" splits after the first number
    let split = label
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i);
    match split {
        Some(i) => {
            let lower = label[..i].trim().parse::<f64>().ok()?;
            let upper = label[i + 1..].trim().parse::<f64>().ok()?;
            (lower <= upper).then_some(ValueData::Range { lower, upper })
        }
        None => {
            let x = label.parse::<f64>().ok()?;
            Some(ValueData::Range { lower: x, upper: x })
        }
    }
}
