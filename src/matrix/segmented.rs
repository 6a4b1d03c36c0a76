//! Joint distributions composed of conditionally independent segments.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::cell::MatrixKind;
use super::coordinate::Coordinate;
use super::ndmatrix::NDimensionalMatrix;
use super::view::MatrixView;
use crate::attribute::Attribute;
use crate::error::{Result, SynthError};

const CONSISTENCY_TOLERANCE: f64 = 1e-6;

/// A joint distribution stored as frequency sub-matrices over (possibly
/// overlapping) attribute subsets.
///
/// Segments are chained in order: each segment is conditionally
/// independent of the earlier ones given the attributes it shares with
/// them. Queries that fit inside one segment are answered by that segment;
/// full coordinates use the chain rule; other partial queries sum the
/// lazily materialised joint.
#[derive(Debug, Clone)]
pub struct SegmentedMatrix {
    label: String,
    segments: Vec<NDimensionalMatrix>,
    dimensions: Vec<Attribute>,
    joint: OnceLock<BTreeMap<Coordinate, f64>>,
}

impl SegmentedMatrix {
    /// Builds a segmented matrix, normalizing every segment.
    ///
    /// # Errors
    /// `InvalidDistribution` if there are no segments, a segment is empty,
    /// or two segments disagree on the marginal of their shared attributes.
    pub fn new(label: &str, segments: Vec<NDimensionalMatrix>) -> Result<Self> {
        if segments.is_empty() {
            return Err(SynthError::InvalidDistribution(format!(
                "segmented matrix '{label}' needs at least one segment"
            )));
        }
        let mut normalized: Vec<NDimensionalMatrix> = Vec::with_capacity(segments.len());
        let mut dimensions: Vec<Attribute> = Vec::new();
        for segment in segments {
            let segment = segment.to_frequencies()?;
            let shared = shared_dimensions(&dimensions, segment.dimensions());
            if !shared.is_empty() {
                if let Some(previous) = normalized
                    .iter()
                    .find(|p| shared.iter().all(|d| p.has_dimension(d.name())))
                {
                    check_agreement(previous, &segment, &shared)?;
                }
            }
            for d in segment.dimensions() {
                if !dimensions.contains(d) {
                    dimensions.push(d.clone());
                }
            }
            normalized.push(segment);
        }
        dimensions.sort();
        Ok(Self {
            label: label.to_string(),
            segments: normalized,
            dimensions,
            joint: OnceLock::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn segments(&self) -> &[NDimensionalMatrix] {
        &self.segments
    }

    /// First segment spanning every attribute of `coordinate`.
    pub fn owner(&self, coordinate: &Coordinate) -> Option<&NDimensionalMatrix> {
        self.segments
            .iter()
            .find(|s| coordinate.attribute_names().all(|a| s.has_dimension(a)))
    }

    fn check(&self, coordinate: &Coordinate) -> Result<()> {
        for name in coordinate.attribute_names() {
            if !self.dimensions.iter().any(|d| d.name() == name) {
                return Err(SynthError::UnknownDimension {
                    attribute: name.to_string(),
                    matrix: format!("segmented matrix '{}'", self.label),
                });
            }
        }
        Ok(())
    }

    /// Probability of a full coordinate by the chain rule.
    fn chain(&self, coordinate: &Coordinate) -> Result<f64> {
        let mut p = 1.0;
        let mut covered: Vec<Attribute> = Vec::new();
        for segment in &self.segments {
            let local = coordinate.project(segment.dimensions());
            let num = segment.get_val(&local)?.value();
            if num == 0.0 {
                return Ok(0.0);
            }
            let shared = shared_dimensions(&covered, segment.dimensions());
            if shared.is_empty() {
                p *= num;
            } else {
                let den = segment.get_val(&local.project(&shared))?.value();
                if den == 0.0 {
                    return Ok(0.0);
                }
                p *= num / den;
            }
            for d in segment.dimensions() {
                if !covered.contains(d) {
                    covered.push(d.clone());
                }
            }
        }
        Ok(p)
    }

    fn joint(&self) -> &BTreeMap<Coordinate, f64> {
        self.joint.get_or_init(|| {
            let mut acc = BTreeMap::from([(Coordinate::default(), 1.0)]);
            let mut covered: Vec<Attribute> = Vec::new();
            for segment in &self.segments {
                acc = join_conditional(&acc, &covered, segment);
                for d in segment.dimensions() {
                    if !covered.contains(d) {
                        covered.push(d.clone());
                    }
                }
            }
            acc
        })
    }

    /// Materialises the joint as a global frequency table.
    pub fn materialize(&self) -> Result<NDimensionalMatrix> {
        let mut full = NDimensionalMatrix::new(
            &self.label,
            MatrixKind::GlobalFrequencyTable,
            self.dimensions.clone(),
        );
        for (coordinate, p) in self.support()? {
            full.set_unchecked(coordinate, p);
        }
        Ok(full)
    }
}

impl MatrixView for SegmentedMatrix {
    fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    fn probability(&self, coordinate: &Coordinate) -> Result<f64> {
        self.check(coordinate)?;
        if let Some(owner) = self.owner(coordinate) {
            return Ok(owner.get_val(coordinate)?.value());
        }
        if coordinate.len() == self.dimensions.len() {
            return self.chain(coordinate);
        }
        Ok(self
            .joint()
            .iter()
            .filter(|(key, _)| coordinate.is_subset_of(key))
            .map(|(_, p)| p)
            .sum())
    }

    fn support(&self) -> Result<Vec<(Coordinate, f64)>> {
        let joint = self.joint();
        let total: f64 = joint.values().sum();
        if total <= 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "segmented matrix '{}' has no joint mass",
                self.label
            )));
        }
        Ok(joint
            .iter()
            .filter(|(_, &p)| p > 0.0)
            .map(|(c, p)| (c.clone(), p / total))
            .collect())
    }
}

fn shared_dimensions(covered: &[Attribute], dimensions: &[Attribute]) -> Vec<Attribute> {
    dimensions
        .iter()
        .filter(|d| covered.contains(d))
        .cloned()
        .collect()
}

fn check_agreement(
    previous: &NDimensionalMatrix,
    segment: &NDimensionalMatrix,
    shared: &[Attribute],
) -> Result<()> {
    let left = previous.project(shared)?;
    let right = segment.project(shared)?;
    for coordinate in Coordinate::enumerate(shared) {
        let l = left.get_val(&coordinate)?.value();
        let r = right.get_val(&coordinate)?.value();
        if (l - r).abs() > CONSISTENCY_TOLERANCE {
            return Err(SynthError::InvalidDistribution(format!(
                "marginals '{}' and '{}' disagree on {coordinate}: {l} vs {r}",
                previous.label(),
                segment.label()
            )));
        }
    }
    Ok(())
}

/// Extends a joint over `covered` with a segment, conditioning the segment
/// on the attributes both share.
fn join_conditional(
    acc: &BTreeMap<Coordinate, f64>,
    covered: &[Attribute],
    segment: &NDimensionalMatrix,
) -> BTreeMap<Coordinate, f64> {
    let shared = shared_dimensions(covered, segment.dimensions());
    let mut groups: BTreeMap<Coordinate, (f64, Vec<(&Coordinate, f64)>)> = BTreeMap::new();
    for (key, cell) in segment.iter() {
        let entry = groups.entry(key.project(&shared)).or_default();
        entry.0 += cell.value();
        entry.1.push((key, cell.value()));
    }
    let mut out = BTreeMap::new();
    for (coordinate, &p) in acc {
        let Some((mass, members)) = groups.get(&coordinate.project(&shared)) else {
            continue;
        };
        if *mass <= 0.0 {
            continue;
        }
        for (key, q) in members {
            if let Some(merged) = coordinate.merge(key) {
                *out.entry(merged).or_insert(0.0) += p * q / mass;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        sex: Attribute,
        age: Attribute,
        job: Attribute,
    }

    fn fixture() -> Fixture {
        Fixture {
            sex: Attribute::nominal("Sex", &["M", "F"]).unwrap(),
            age: Attribute::ordinal("Age", &["young", "old"]).unwrap(),
            job: Attribute::nominal("Job", &["yes", "no"]).unwrap(),
        }
    }

    fn table(
        label: &str,
        dims: &[&Attribute],
        cells: &[(&[&str], f64)],
    ) -> NDimensionalMatrix {
        let mut m = NDimensionalMatrix::contingency(label, dims.iter().map(|a| (*a).clone()).collect());
        for (labels, n) in cells {
            let pairs: Vec<(&Attribute, &str)> =
                dims.iter().copied().zip(labels.iter().copied()).collect();
            m.add_value(&Coordinate::of(&pairs).unwrap(), *n).unwrap();
        }
        m
    }

    #[test]
    fn test_routes_to_owner() {
        let f = fixture();
        let sex_age = table(
            "sex x age",
            &[&f.sex, &f.age],
            &[(&["M", "young"], 30.0), (&["M", "old"], 20.0), (&["F", "young"], 10.0), (&["F", "old"], 40.0)],
        );
        let age_job = table(
            "age x job",
            &[&f.age, &f.job],
            &[(&["young", "yes"], 20.0), (&["young", "no"], 20.0), (&["old", "yes"], 15.0), (&["old", "no"], 45.0)],
        );
        let m = SegmentedMatrix::new("population", vec![sex_age, age_job]).unwrap();
        assert_eq!(m.dimensions().len(), 3);
        let p = m
            .probability(&Coordinate::of(&[(&f.sex, "M")]).unwrap())
            .unwrap();
        assert!((p - 0.5).abs() < 1e-12);
        let q = m
            .probability(&Coordinate::of(&[(&f.job, "yes")]).unwrap())
            .unwrap();
        assert!((q - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_chain_rule_full_coordinate() {
        let f = fixture();
        let sex_age = table(
            "sex x age",
            &[&f.sex, &f.age],
            &[(&["M", "young"], 30.0), (&["M", "old"], 20.0), (&["F", "young"], 10.0), (&["F", "old"], 40.0)],
        );
        let age_job = table(
            "age x job",
            &[&f.age, &f.job],
            &[(&["young", "yes"], 20.0), (&["young", "no"], 20.0), (&["old", "yes"], 15.0), (&["old", "no"], 45.0)],
        );
        let m = SegmentedMatrix::new("population", vec![sex_age, age_job]).unwrap();
        let c = Coordinate::of(&[(&f.sex, "M"), (&f.age, "young"), (&f.job, "yes")]).unwrap();
        // P(M, young) * P(yes | young) = 0.3 * 0.5
        assert!((m.probability(&c).unwrap() - 0.15).abs() < 1e-12);

        // spanning partial query goes through the joint: P(M, yes)
        let spanning = Coordinate::of(&[(&f.sex, "M"), (&f.job, "yes")]).unwrap();
        let expected = 0.3 * 0.5 + 0.2 * 0.25;
        assert!((m.probability(&spanning).unwrap() - expected).abs() < 1e-12);

        let support = m.support().unwrap();
        assert_eq!(support.len(), 8);
        let total: f64 = support.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disagreeing_overlap_rejected() {
        let f = fixture();
        let sex_age = table("a", &[&f.sex, &f.age], &[(&["M", "young"], 50.0), (&["F", "old"], 50.0)]);
        let age_job = table("b", &[&f.age, &f.job], &[(&["young", "yes"], 90.0), (&["old", "no"], 10.0)]);
        let err = SegmentedMatrix::new("bad", vec![sex_age, age_job]).unwrap_err();
        assert!(matches!(err, SynthError::InvalidDistribution(_)));
    }

    #[test]
    fn test_unknown_dimension() {
        let f = fixture();
        let sex = table("sex", &[&f.sex], &[(&["M"], 1.0)]);
        let m = SegmentedMatrix::new("s", vec![sex]).unwrap();
        let err = m
            .probability(&Coordinate::of(&[(&f.job, "no")]).unwrap())
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(SegmentedMatrix::new("none", vec![]).is_err());
    }

    #[test]
    fn test_materialize() {
        let f = fixture();
        let sex = table("sex", &[&f.sex], &[(&["M"], 1.0), (&["F"], 3.0)]);
        let job = table("job", &[&f.job], &[(&["yes"], 1.0), (&["no"], 1.0)]);
        let m = SegmentedMatrix::new("independent", vec![sex, job]).unwrap();
        let full = m.materialize().unwrap();
        assert_eq!(full.size(), 4);
        assert!(full.is_normalized());
        let c = Coordinate::of(&[(&f.sex, "F"), (&f.job, "no")]).unwrap();
        assert!((full.get_val(&c).unwrap().value() - 0.375).abs() < 1e-12);
    }
}
