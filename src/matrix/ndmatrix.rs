//! Sparse n-dimensional contingency / frequency matrix.

use std::collections::{BTreeMap, BTreeSet};

use super::cell::{Cell, MatrixKind};
use super::coordinate::Coordinate;
use super::view::MatrixView;
use crate::attribute::{Attribute, Value};
use crate::error::{Result, SynthError};

/// Tolerance accepted on frequency sums and bounds.
pub const FREQUENCY_EPSILON: f64 = 1e-8;

/// Mapping from full coordinates to cells over a fixed set of attributes.
///
/// Only non-zero cells are stored; any other coordinate is implicitly zero.
/// Storage is ordered, so iteration (and every computation that folds over
/// cells) is deterministic.
///
/// # Examples
///
/// ```
/// use u_synthpop::attribute::Attribute;
/// use u_synthpop::matrix::{Coordinate, MatrixKind, NDimensionalMatrix};
///
/// let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
/// let age = Attribute::nominal("Age", &["young", "old"]).unwrap();
/// let mut m = NDimensionalMatrix::new("sex x age", MatrixKind::GlobalFrequencyTable, vec![sex.clone(), age.clone()]);
/// m.set_value(&Coordinate::of(&[(&sex, "M"), (&age, "young")]).unwrap(), 0.3).unwrap();
/// m.set_value(&Coordinate::of(&[(&sex, "M"), (&age, "old")]).unwrap(), 0.2).unwrap();
/// let male = m.get_val(&Coordinate::of(&[(&sex, "M")]).unwrap()).unwrap();
/// assert!((male.value() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct NDimensionalMatrix {
    label: String,
    kind: MatrixKind,
    dimensions: Vec<Attribute>,
    cells: BTreeMap<Coordinate, Cell>,
}

impl NDimensionalMatrix {
    /// Creates an empty matrix. Duplicate dimensions are collapsed.
    pub fn new(label: &str, kind: MatrixKind, dimensions: Vec<Attribute>) -> Self {
        let dimensions: Vec<Attribute> = dimensions
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            label: label.to_string(),
            kind,
            dimensions,
            cells: BTreeMap::new(),
        }
    }

    pub fn contingency(label: &str, dimensions: Vec<Attribute>) -> Self {
        Self::new(label, MatrixKind::ContingencyTable, dimensions)
    }

    pub fn frequency(label: &str, dimensions: Vec<Attribute>) -> Self {
        Self::new(label, MatrixKind::GlobalFrequencyTable, dimensions)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    pub fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    pub fn has_dimension(&self, attribute: &str) -> bool {
        self.dimension(attribute).is_some()
    }

    pub fn dimension(&self, attribute: &str) -> Option<&Attribute> {
        self.dimensions.iter().find(|d| d.name() == attribute)
    }

    fn unknown(&self, attribute: &str) -> SynthError {
        SynthError::UnknownDimension {
            attribute: attribute.to_string(),
            matrix: format!("matrix '{}'", self.label),
        }
    }

    /// Checks that every value of `coordinate` lives in one of the
    /// matrix's dimensions.
    pub fn check(&self, coordinate: &Coordinate) -> Result<()> {
        for value in coordinate.values() {
            self.check_value(value)?;
        }
        Ok(())
    }

    fn check_value(&self, value: &Value) -> Result<()> {
        let attribute = self
            .dimension(value.attribute_name())
            .ok_or_else(|| self.unknown(value.attribute_name()))?;
        if attribute.owns(value) {
            Ok(())
        } else {
            Err(SynthError::UnknownValue {
                attribute: attribute.name().to_string(),
                value: value.label().to_string(),
            })
        }
    }

    fn check_full(&self, coordinate: &Coordinate) -> Result<()> {
        self.check(coordinate)?;
        if coordinate.len() != self.dimensions.len() {
            return Err(SynthError::Usage(format!(
                "coordinate {coordinate} must span every dimension of matrix '{}'",
                self.label
            )));
        }
        Ok(())
    }

    fn check_number(&self, x: f64) -> Result<()> {
        if !x.is_finite() || x < 0.0 {
            return Err(SynthError::Usage(format!(
                "cell values must be finite and non-negative, got {x}"
            )));
        }
        if self.kind.is_frequency() && x > 1.0 + FREQUENCY_EPSILON {
            return Err(SynthError::Usage(format!(
                "frequency cells must lie in [0, 1], got {x}"
            )));
        }
        if !self.kind.is_frequency() && x.fract() != 0.0 {
            return Err(SynthError::Usage(format!(
                "contingency table '{}' holds whole counts, got {x}",
                self.label
            )));
        }
        Ok(())
    }

    /// Inserts or overwrites the cell at a full coordinate.
    ///
    /// Setting zero removes the stored cell.
    pub fn set_value(&mut self, coordinate: &Coordinate, x: f64) -> Result<()> {
        self.check_full(coordinate)?;
        self.check_number(x)?;
        let cell = self.kind.cell(x);
        if cell.is_zero() {
            self.cells.remove(coordinate);
        } else {
            self.cells.insert(coordinate.clone(), cell);
        }
        Ok(())
    }

    /// Adds `x` to the cell at a full coordinate.
    pub fn add_value(&mut self, coordinate: &Coordinate, x: f64) -> Result<()> {
        self.check_full(coordinate)?;
        self.check_number(x)?;
        self.add_unchecked(coordinate, x);
        Ok(())
    }

    pub(crate) fn add_unchecked(&mut self, coordinate: &Coordinate, x: f64) {
        let kind = self.kind;
        let cell = self
            .cells
            .entry(coordinate.clone())
            .or_insert_with(|| kind.zero());
        cell.add(x);
        if cell.is_zero() {
            self.cells.remove(coordinate);
        }
    }

    pub(crate) fn set_unchecked(&mut self, coordinate: Coordinate, x: f64) {
        let cell = self.kind.cell(x);
        if cell.is_zero() {
            self.cells.remove(&coordinate);
        } else {
            self.cells.insert(coordinate, cell);
        }
    }

    /// Value at `coordinate`, summing out attributes the query omits.
    ///
    /// # Errors
    /// `UnknownDimension` if the query names an attribute outside the
    /// matrix.
    pub fn get_val(&self, coordinate: &Coordinate) -> Result<Cell> {
        self.check(coordinate)?;
        if coordinate.len() == self.dimensions.len() {
            return Ok(self
                .cells
                .get(coordinate)
                .copied()
                .unwrap_or_else(|| self.kind.zero()));
        }
        let mut total = self.kind.zero();
        for (key, cell) in &self.cells {
            if coordinate.is_subset_of(key) {
                total.add(cell.value());
            }
        }
        Ok(total)
    }

    /// Value of a query where repeated attributes mean "any of".
    ///
    /// `[Age=young, Age=old, Sex=M]` sums every cell with `Sex=M` and an
    /// age of either `young` or `old`.
    pub fn get_val_any(&self, values: &[Value]) -> Result<Cell> {
        let mut groups: BTreeMap<&str, Vec<&Value>> = BTreeMap::new();
        for value in values {
            self.check_value(value)?;
            groups.entry(value.attribute_name()).or_default().push(value);
        }
        let mut total = self.kind.zero();
        for (key, cell) in &self.cells {
            let hit = groups.iter().all(|(attribute, accepted)| {
                key.value_of(attribute)
                    .is_some_and(|v| accepted.iter().any(|a| *a == v))
            });
            if hit {
                total.add(cell.value());
            }
        }
        Ok(total)
    }

    /// Number of explicitly stored (non-zero) cells.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grand total over all cells.
    pub fn total(&self) -> f64 {
        self.cells.values().map(Cell::value).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &Cell)> {
        self.cells.iter()
    }

    /// Divides every cell by the grand total.
    ///
    /// A contingency table becomes a global frequency table.
    ///
    /// # Errors
    /// `InvalidDistribution` if the matrix is empty.
    pub fn normalize(&mut self) -> Result<()> {
        let total = self.total();
        if total <= 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "matrix '{}' has no mass to normalize",
                self.label
            )));
        }
        if self.kind == MatrixKind::ContingencyTable {
            self.kind = MatrixKind::GlobalFrequencyTable;
        }
        for cell in self.cells.values_mut() {
            *cell = Cell::Frequency(cell.value() / total);
        }
        Ok(())
    }

    /// Normalized copy; frequency tables that already sum to one are
    /// returned unchanged.
    pub fn to_frequencies(&self) -> Result<Self> {
        let mut copy = self.clone();
        if !(self.kind.is_frequency() && self.is_normalized()) {
            copy.normalize()?;
        }
        Ok(copy)
    }

    /// Whether the cells sum to one within [`FREQUENCY_EPSILON`].
    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= FREQUENCY_EPSILON
    }

    /// Marginal matrix over a subset of the dimensions.
    pub fn project(&self, dimensions: &[Attribute]) -> Result<Self> {
        for d in dimensions {
            if !self.has_dimension(d.name()) {
                return Err(self.unknown(d.name()));
            }
        }
        let mut marginal = Self::new(
            &format!("{} | {}", self.label, join_names(dimensions)),
            self.kind,
            dimensions.to_vec(),
        );
        for (key, cell) in &self.cells {
            marginal.add_unchecked(&key.project(dimensions), cell.value());
        }
        Ok(marginal)
    }

    /// Adds every cell of `other` into `self`.
    ///
    /// # Errors
    /// `Usage` when the dimension sets differ.
    pub fn merge_add(&mut self, other: &NDimensionalMatrix) -> Result<()> {
        if self.dimensions != other.dimensions {
            return Err(SynthError::Usage(format!(
                "cannot merge matrix '{}' into '{}': dimensions differ",
                other.label, self.label
            )));
        }
        for (key, cell) in &other.cells {
            self.add_unchecked(key, cell.value());
        }
        Ok(())
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    pub(crate) fn set_kind(&mut self, kind: MatrixKind) {
        if kind != self.kind {
            self.kind = kind;
            for cell in self.cells.values_mut() {
                *cell = kind.cell(cell.value());
            }
        }
    }
}

pub(crate) fn join_names(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(" x ")
}

impl MatrixView for NDimensionalMatrix {
    fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    fn probability(&self, coordinate: &Coordinate) -> Result<f64> {
        let total = self.total();
        if total <= 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "matrix '{}' is empty",
                self.label
            )));
        }
        Ok(self.get_val(coordinate)?.value() / total)
    }

    fn support(&self) -> Result<Vec<(Coordinate, f64)>> {
        let total = self.total();
        if total <= 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "matrix '{}' is empty",
                self.label
            )));
        }
        Ok(self
            .cells
            .iter()
            .map(|(c, cell)| (c.clone(), cell.value() / total))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sex_age() -> (Attribute, Attribute) {
        (
            Attribute::nominal("Sex", &["M", "F"]).unwrap(),
            Attribute::ordinal("Age", &["young", "old"]).unwrap(),
        )
    }

    fn scenario_a() -> (NDimensionalMatrix, Attribute, Attribute) {
        let (sex, age) = sex_age();
        let mut m = NDimensionalMatrix::frequency("scenario a", vec![sex.clone(), age.clone()]);
        for (s, a, p) in [("M", "young", 0.3), ("M", "old", 0.2), ("F", "young", 0.1), ("F", "old", 0.4)] {
            m.set_value(&Coordinate::of(&[(&sex, s), (&age, a)]).unwrap(), p)
                .unwrap();
        }
        (m, sex, age)
    }

    #[test]
    fn test_scenario_a_marginal() {
        let (m, sex, _) = scenario_a();
        let male = m.get_val(&Coordinate::of(&[(&sex, "M")]).unwrap()).unwrap();
        assert!((male.value() - 0.5).abs() < 1e-12);
        assert_eq!(m.size(), 4);
        assert!(m.is_normalized());
    }

    #[test]
    fn test_empty_query_is_total() {
        let (m, _, _) = scenario_a();
        let all = m.get_val(&Coordinate::default()).unwrap();
        assert!((all.value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_dimension_is_usage_error() {
        let (m, _, _) = scenario_a();
        let region = Attribute::nominal("Region", &["north"]).unwrap();
        let err = m
            .get_val(&Coordinate::of(&[(&region, "north")]).unwrap())
            .unwrap_err();
        assert!(matches!(err, SynthError::UnknownDimension { .. }));
        assert!(err.is_usage());
    }

    #[test]
    fn test_foreign_value_same_name_rejected() {
        let (m, _, _) = scenario_a();
        let other_sex = Attribute::nominal("Sex", &["M", "F", "X"]).unwrap();
        let err = m
            .get_val(&Coordinate::of(&[(&other_sex, "X")]).unwrap())
            .unwrap_err();
        assert!(matches!(err, SynthError::UnknownValue { .. }));
    }

    #[test]
    fn test_set_partial_coordinate_rejected() {
        let (mut m, sex, _) = scenario_a();
        let err = m
            .set_value(&Coordinate::of(&[(&sex, "M")]).unwrap(), 0.1)
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_frequency_bounds() {
        let (mut m, sex, age) = scenario_a();
        let c = Coordinate::of(&[(&sex, "M"), (&age, "old")]).unwrap();
        assert!(m.set_value(&c, 1.5).is_err());
        assert!(m.set_value(&c, -0.1).is_err());
        assert!(m.set_value(&c, f64::NAN).is_err());
    }

    #[test]
    fn test_set_zero_removes() {
        let (mut m, sex, age) = scenario_a();
        m.set_value(&Coordinate::of(&[(&sex, "M"), (&age, "old")]).unwrap(), 0.0)
            .unwrap();
        assert_eq!(m.size(), 3);
    }

    #[test]
    fn test_or_query() {
        let (m, sex, age) = scenario_a();
        let values = vec![
            age.value_of("young").unwrap(),
            age.value_of("old").unwrap(),
            sex.value_of("F").unwrap(),
        ];
        let v = m.get_val_any(&values).unwrap();
        assert!((v.value() - 0.5).abs() < 1e-12);
        let young_only = m.get_val_any(&values[..1]).unwrap();
        assert!((young_only.value() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_contingency() {
        let (sex, age) = sex_age();
        let mut m = NDimensionalMatrix::contingency("counts", vec![sex.clone(), age.clone()]);
        m.add_value(&Coordinate::of(&[(&sex, "M"), (&age, "old")]).unwrap(), 3.0)
            .unwrap();
        m.add_value(&Coordinate::of(&[(&sex, "F"), (&age, "old")]).unwrap(), 1.0)
            .unwrap();
        assert_eq!(
            m.get_val(&Coordinate::of(&[(&age, "old")]).unwrap()).unwrap(),
            Cell::Count(4)
        );
        m.normalize().unwrap();
        assert_eq!(m.kind(), MatrixKind::GlobalFrequencyTable);
        assert!(m.is_normalized());
        let f = m.get_val(&Coordinate::of(&[(&sex, "M")]).unwrap()).unwrap();
        assert!((f.value() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_contingency_rejects_fractional_counts() {
        let (sex, _) = sex_age();
        let mut m = NDimensionalMatrix::contingency("weighted", vec![sex.clone()]);
        let male = Coordinate::of(&[(&sex, "M")]).unwrap();
        assert!(m.set_value(&male, 0.4).unwrap_err().is_usage());
        assert!(m.add_value(&male, 2.5).unwrap_err().is_usage());
        assert_eq!(m.size(), 0);

        m.add_value(&male, 2.0).unwrap();
        assert_eq!(m.get_val(&male).unwrap(), Cell::Count(2));

        let mut weights = NDimensionalMatrix::new("weights", MatrixKind::LocalFrequencyTable, vec![sex]);
        weights.set_value(&male, 0.4).unwrap();
        assert_eq!(weights.size(), 1);
    }

    #[test]
    fn test_normalize_empty_fails() {
        let (sex, _) = sex_age();
        let mut m = NDimensionalMatrix::contingency("empty", vec![sex]);
        assert!(matches!(
            m.normalize(),
            Err(SynthError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn test_project_and_merge() {
        let (m, sex, _) = scenario_a();
        let marginal = m.project(std::slice::from_ref(&sex)).unwrap();
        assert_eq!(marginal.dimensions().len(), 1);
        assert!((marginal.total() - 1.0).abs() < 1e-12);

        let mut doubled = marginal.clone();
        doubled.set_kind(MatrixKind::LocalFrequencyTable);
        let mut target = marginal.clone();
        target.set_kind(MatrixKind::LocalFrequencyTable);
        target.merge_add(&doubled).unwrap();
        assert!((target.total() - 2.0).abs() < 1e-12);

        assert!(target.merge_add(&m).is_err());
    }

    #[test]
    fn test_support_sums_to_one() {
        let (m, _, _) = scenario_a();
        let support = m.support().unwrap();
        let total: f64 = support.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_normalize_sums_to_one(counts in proptest::collection::vec(0u32..1000, 6)) {
            prop_assume!(counts.iter().any(|&c| c > 0));
            let a = Attribute::nominal("A", &["a1", "a2", "a3"]).unwrap();
            let b = Attribute::nominal("B", &["b1", "b2"]).unwrap();
            let mut m = NDimensionalMatrix::contingency("prop", vec![a.clone(), b.clone()]);
            for (c, n) in Coordinate::enumerate(&[a, b]).iter().zip(&counts) {
                m.add_value(c, *n as f64).unwrap();
            }
            m.normalize().unwrap();
            prop_assert!((m.total() - 1.0).abs() < 1e-8);
        }

        #[test]
        fn prop_marginal_consistency(weights in proptest::collection::vec(0.0f64..1.0, 12)) {
            let a = Attribute::nominal("A", &["a1", "a2", "a3"]).unwrap();
            let b = Attribute::nominal("B", &["b1", "b2"]).unwrap();
            let c = Attribute::nominal("C", &["c1", "c2"]).unwrap();
            let dims = vec![a.clone(), b.clone(), c.clone()];
            let mut m = NDimensionalMatrix::new("prop", MatrixKind::LocalFrequencyTable, dims.clone());
            for (coord, w) in Coordinate::enumerate(&dims).iter().zip(&weights) {
                m.set_value(coord, *w).unwrap();
            }
            // summing over A's values, restricted by the rest, equals the query without A
            for rest in Coordinate::enumerate(&[b.clone()]) {
                let summed: f64 = a
                    .values()
                    .iter()
                    .map(|v| m.get_val(&rest.with_value(v.clone())).unwrap().value())
                    .sum();
                let direct = m.get_val(&rest).unwrap().value();
                prop_assert!((summed - direct).abs() < 1e-9);
            }
        }
    }
}
