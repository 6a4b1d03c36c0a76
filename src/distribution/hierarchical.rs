//! Hierarchical (Bayesian-tree) distribution.
//!
//! Each non-root attribute depends on exactly one parent. The distribution
//! is described by a marginal per root and a conditional table per
//! `(child, parent value)`. The same tree drives the sampling order of
//! [`HierarchicalSampler`](crate::sampler::HierarchicalSampler).

use std::collections::{BTreeMap, VecDeque};

use log::debug;

use crate::attribute::{Attribute, Value};
use crate::error::{Result, SynthError};
use crate::matrix::{Coordinate, MatrixKind, NDimensionalMatrix, SegmentedMatrix};

/// Dependency tree over attributes.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    parents: BTreeMap<Attribute, Option<Attribute>>,
    order: Vec<Attribute>,
}

impl DependencyTree {
    /// Builds a tree from `(attribute, parent)` pairs.
    ///
    /// # Errors
    /// `Usage` if an attribute is listed twice, a parent is not listed, or
    /// the edges contain a cycle.
    pub fn new(edges: &[(Attribute, Option<Attribute>)]) -> Result<Self> {
        let mut parents = BTreeMap::new();
        for (attribute, parent) in edges {
            if parents.insert(attribute.clone(), parent.clone()).is_some() {
                return Err(SynthError::Usage(format!(
                    "attribute '{attribute}' appears twice in the dependency tree"
                )));
            }
        }
        for (attribute, parent) in &parents {
            if let Some(parent) = parent {
                if !parents.contains_key(parent) {
                    return Err(SynthError::Usage(format!(
                        "parent '{parent}' of '{attribute}' is not in the dependency tree"
                    )));
                }
            }
        }

        // breadth first from the roots
        let mut order = Vec::with_capacity(parents.len());
        let mut queue: VecDeque<Attribute> = parents
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(a, _)| a.clone())
            .collect();
        while let Some(attribute) = queue.pop_front() {
            for (child, parent) in &parents {
                if parent.as_ref() == Some(&attribute) {
                    queue.push_back(child.clone());
                }
            }
            order.push(attribute);
        }
        if order.len() != parents.len() {
            return Err(SynthError::Usage(
                "dependency tree contains a cycle".into(),
            ));
        }
        Ok(Self { parents, order })
    }

    /// Attributes with roots first, then breadth first.
    pub fn order(&self) -> &[Attribute] {
        &self.order
    }

    pub fn parent(&self, attribute: &Attribute) -> Option<&Attribute> {
        self.parents.get(attribute).and_then(Option::as_ref)
    }

    pub fn is_root(&self, attribute: &Attribute) -> bool {
        matches!(self.parents.get(attribute), Some(None))
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.parents.contains_key(attribute)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Attribute> {
        self.parents
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(a, _)| a)
    }

    pub fn children<'a>(&'a self, attribute: &'a Attribute) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.parents
            .iter()
            .filter(move |(_, p)| p.as_ref() == Some(attribute))
            .map(|(a, _)| a)
    }
}

/// Marginals and conditionals attached to a [`DependencyTree`].
#[derive(Debug, Clone)]
pub struct HierarchicalHypothesis {
    tree: DependencyTree,
    roots: BTreeMap<Attribute, NDimensionalMatrix>,
    conditionals: BTreeMap<Attribute, BTreeMap<Value, NDimensionalMatrix>>,
}

impl HierarchicalHypothesis {
    pub fn new(tree: DependencyTree) -> Self {
        Self {
            tree,
            roots: BTreeMap::new(),
            conditionals: BTreeMap::new(),
        }
    }

    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    fn single_dimension<'a>(&self, matrix: &'a NDimensionalMatrix) -> Result<&'a Attribute> {
        match matrix.dimensions() {
            [attribute] if self.tree.contains(attribute) => Ok(attribute),
            _ => Err(SynthError::Usage(format!(
                "matrix '{}' must span exactly one attribute of the dependency tree",
                matrix.label()
            ))),
        }
    }

    /// Sets the marginal of a root attribute.
    pub fn set_root_marginal(&mut self, matrix: NDimensionalMatrix) -> Result<()> {
        let attribute = self.single_dimension(&matrix)?.clone();
        if !self.tree.is_root(&attribute) {
            return Err(SynthError::Usage(format!(
                "'{attribute}' is not a root of the dependency tree"
            )));
        }
        self.roots.insert(attribute, matrix);
        Ok(())
    }

    /// Sets the distribution of a child given one value of its parent.
    pub fn set_conditional(&mut self, parent_value: Value, matrix: NDimensionalMatrix) -> Result<()> {
        let child = self.single_dimension(&matrix)?.clone();
        let parent = self.tree.parent(&child).ok_or_else(|| {
            SynthError::Usage(format!("'{child}' is a root and has no conditionals"))
        })?;
        if !parent.owns(&parent_value) {
            return Err(SynthError::UnknownValue {
                attribute: parent.name().to_string(),
                value: parent_value.label().to_string(),
            });
        }
        let mut matrix = matrix;
        matrix.set_kind(MatrixKind::LocalFrequencyTable);
        self.conditionals
            .entry(child)
            .or_default()
            .insert(parent_value, matrix);
        Ok(())
    }

    pub fn root_marginal(&self, attribute: &Attribute) -> Option<&NDimensionalMatrix> {
        self.roots.get(attribute)
    }

    pub fn conditional(&self, child: &Attribute, parent_value: &Value) -> Option<&NDimensionalMatrix> {
        self.conditionals.get(child)?.get(parent_value)
    }

    /// Every conditional of `child`, keyed by parent value.
    pub fn conditionals_of<'a>(
        &'a self,
        child: &Attribute,
    ) -> impl Iterator<Item = (&'a Value, &'a NDimensionalMatrix)> + 'a {
        self.conditionals.get(child).into_iter().flatten()
    }

    /// Composes the joint as a segmented matrix: one segment per root
    /// marginal and one `(parent, child)` segment per edge.
    ///
    /// # Errors
    /// `InvalidDistribution` if a root lacks a marginal, or a parent value
    /// with positive mass has no (or an empty) conditional.
    pub fn build(&self) -> Result<SegmentedMatrix> {
        let mut marginals: BTreeMap<Attribute, NDimensionalMatrix> = BTreeMap::new();
        let mut segments = Vec::with_capacity(self.tree.order().len());

        for attribute in self.tree.order() {
            match self.tree.parent(attribute) {
                None => {
                    let marginal = self
                        .roots
                        .get(attribute)
                        .ok_or_else(|| {
                            SynthError::InvalidDistribution(format!(
                                "root '{attribute}' has no marginal"
                            ))
                        })?
                        .to_frequencies()?;
                    segments.push(marginal.clone());
                    marginals.insert(attribute.clone(), marginal);
                }
                Some(parent) => {
                    let parent_marginal = marginals.get(parent).ok_or_else(|| {
                        SynthError::InvalidDistribution(format!(
                            "parent '{parent}' of '{attribute}' has no distribution"
                        ))
                    })?;
                    let joint = self.edge_joint(attribute, parent, parent_marginal)?;
                    marginals.insert(attribute.clone(), joint.project(std::slice::from_ref(attribute))?);
                    segments.push(joint);
                }
            }
        }

        debug!(
            "hierarchical hypothesis: {} attributes, {} segments",
            self.tree.order().len(),
            segments.len()
        );
        SegmentedMatrix::new("hierarchical", segments)
    }

    fn edge_joint(
        &self,
        child: &Attribute,
        parent: &Attribute,
        parent_marginal: &NDimensionalMatrix,
    ) -> Result<NDimensionalMatrix> {
        let mut joint = NDimensionalMatrix::frequency(
            &format!("{parent} -> {child}"),
            vec![parent.clone(), child.clone()],
        );
        for (parent_coordinate, p) in parent_marginal.iter() {
            let Some(parent_value) = parent_coordinate.value_of(parent.name()) else {
                continue;
            };
            let conditional = self
                .conditional(child, parent_value)
                .filter(|c| c.total() > 0.0)
                .ok_or_else(|| {
                    SynthError::InvalidDistribution(format!(
                        "'{child}' has no conditional mass given {parent_value:?}"
                    ))
                })?
                .to_frequencies()?;
            for (child_coordinate, q) in conditional.iter() {
                let coordinate = merge_pair(parent_coordinate, child_coordinate)?;
                joint.set_unchecked(coordinate, p.value() * q.value());
            }
        }
        Ok(joint)
    }
}

fn merge_pair(a: &Coordinate, b: &Coordinate) -> Result<Coordinate> {
    a.merge(b)
        .ok_or_else(|| SynthError::Usage(format!("coordinates {a} and {b} conflict")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixView;

    struct Household {
        size: Attribute,
        cars: Attribute,
        kids: Attribute,
    }

    fn household() -> Household {
        Household {
            size: Attribute::ordinal("Size", &["small", "large"]).unwrap(),
            cars: Attribute::integer("Cars", 0..=1).unwrap(),
            kids: Attribute::boolean("Kids").unwrap(),
        }
    }

    fn table(attribute: &Attribute, cells: &[(&str, f64)]) -> NDimensionalMatrix {
        let mut m = NDimensionalMatrix::contingency(attribute.name(), vec![attribute.clone()]);
        for (label, n) in cells {
            m.add_value(&Coordinate::of(&[(attribute, *label)]).unwrap(), *n)
                .unwrap();
        }
        m
    }

    fn tree(h: &Household) -> DependencyTree {
        DependencyTree::new(&[
            (h.size.clone(), None),
            (h.cars.clone(), Some(h.size.clone())),
            (h.kids.clone(), Some(h.size.clone())),
        ])
        .unwrap()
    }

    #[test]
    fn test_tree_order_roots_first() {
        let h = household();
        let t = tree(&h);
        assert_eq!(t.order()[0], h.size);
        assert_eq!(t.order().len(), 3);
        assert!(t.is_root(&h.size));
        assert_eq!(t.parent(&h.cars), Some(&h.size));
        assert_eq!(t.children(&h.size).count(), 2);
        assert_eq!(t.roots().count(), 1);
    }

    #[test]
    fn test_tree_rejects_cycles_and_orphans() {
        let h = household();
        let cycle = DependencyTree::new(&[
            (h.cars.clone(), Some(h.kids.clone())),
            (h.kids.clone(), Some(h.cars.clone())),
        ]);
        assert!(cycle.unwrap_err().is_usage());
        let orphan = DependencyTree::new(&[(h.cars.clone(), Some(h.size.clone()))]);
        assert!(orphan.is_err());
        let twice = DependencyTree::new(&[(h.cars.clone(), None), (h.cars.clone(), None)]);
        assert!(twice.is_err());
    }

    #[test]
    fn test_build_joint() {
        let h = household();
        let mut hypothesis = HierarchicalHypothesis::new(tree(&h));
        hypothesis
            .set_root_marginal(table(&h.size, &[("small", 60.0), ("large", 40.0)]))
            .unwrap();
        let small = h.size.value_of("small").unwrap();
        let large = h.size.value_of("large").unwrap();
        hypothesis
            .set_conditional(small.clone(), table(&h.cars, &[("0", 3.0), ("1", 1.0)]))
            .unwrap();
        hypothesis
            .set_conditional(large.clone(), table(&h.cars, &[("1", 1.0)]))
            .unwrap();
        hypothesis
            .set_conditional(small, table(&h.kids, &[("true", 1.0), ("false", 1.0)]))
            .unwrap();
        hypothesis
            .set_conditional(large, table(&h.kids, &[("true", 1.0)]))
            .unwrap();

        let joint = hypothesis.build().unwrap();
        let c = Coordinate::of(&[(&h.size, "small"), (&h.cars, "0"), (&h.kids, "true")]).unwrap();
        // 0.6 * 0.75 * 0.5
        assert!((joint.probability(&c).unwrap() - 0.225).abs() < 1e-12);
        let one_car = Coordinate::of(&[(&h.cars, "1")]).unwrap();
        // 0.6 * 0.25 + 0.4 * 1.0
        assert!((joint.probability(&one_car).unwrap() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_build_missing_conditional() {
        let h = household();
        let mut hypothesis = HierarchicalHypothesis::new(
            DependencyTree::new(&[(h.size.clone(), None), (h.cars.clone(), Some(h.size.clone()))])
                .unwrap(),
        );
        hypothesis
            .set_root_marginal(table(&h.size, &[("small", 1.0), ("large", 1.0)]))
            .unwrap();
        hypothesis
            .set_conditional(h.size.value_of("small").unwrap(), table(&h.cars, &[("0", 1.0)]))
            .unwrap();
        assert!(matches!(
            hypothesis.build(),
            Err(SynthError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn test_setters_validate() {
        let h = household();
        let mut hypothesis = HierarchicalHypothesis::new(tree(&h));
        // cars is not a root
        assert!(hypothesis
            .set_root_marginal(table(&h.cars, &[("0", 1.0)]))
            .is_err());
        // root has no conditionals
        assert!(hypothesis
            .set_conditional(h.cars.value_of("0").unwrap(), table(&h.size, &[("small", 1.0)]))
            .is_err());
        // parent value from the wrong attribute
        assert!(hypothesis
            .set_conditional(h.kids.value_of("true").unwrap(), table(&h.cars, &[("0", 1.0)]))
            .is_err());
    }
}
