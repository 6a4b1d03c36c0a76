//! Tree-ordered conditional sampler.

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;

use super::coordinate::{CoordinateSampler, SamplerKind};
use super::types::Sampler;
use crate::attribute::{Attribute, Value};
use crate::distribution::{DependencyTree, HierarchicalHypothesis};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

/// Draws attributes root first, each child from the conditional table
/// selected by its parent's drawn value.
///
/// Unlike [`HierarchicalHypothesis::build`], construction tolerates parent
/// values without conditional mass; reaching one during a draw is a
/// `ZeroConditionalMass` error.
#[derive(Debug, Clone)]
pub struct HierarchicalSampler {
    tree: DependencyTree,
    dimensions: Vec<Attribute>,
    roots: BTreeMap<Attribute, CoordinateSampler>,
    conditionals: BTreeMap<Attribute, BTreeMap<Value, CoordinateSampler>>,
}

impl HierarchicalSampler {
    /// Builds one inner sampler of `kind` per root marginal and per
    /// non-empty conditional.
    ///
    /// # Errors
    /// `InvalidDistribution` if a root has no marginal with positive mass.
    pub fn new(hypothesis: &HierarchicalHypothesis, kind: SamplerKind) -> Result<Self> {
        let tree = hypothesis.tree().clone();
        let mut roots = BTreeMap::new();
        let mut conditionals: BTreeMap<Attribute, BTreeMap<Value, CoordinateSampler>> =
            BTreeMap::new();

        for attribute in tree.order() {
            if tree.is_root(attribute) {
                let marginal = hypothesis.root_marginal(attribute).ok_or_else(|| {
                    SynthError::InvalidDistribution(format!("root '{attribute}' has no marginal"))
                })?;
                roots.insert(attribute.clone(), kind.from_view(marginal)?);
                continue;
            }
            let mut by_parent = BTreeMap::new();
            for (parent_value, matrix) in hypothesis.conditionals_of(attribute) {
                if matrix.total() > 0.0 {
                    by_parent.insert(parent_value.clone(), kind.from_view(matrix)?);
                }
            }
            conditionals.insert(attribute.clone(), by_parent);
        }

        let mut dimensions = tree.order().to_vec();
        dimensions.sort();
        debug!(
            "hierarchical sampler: {} roots, {} conditional attributes",
            roots.len(),
            conditionals.len()
        );
        Ok(Self {
            tree,
            dimensions,
            roots,
            conditionals,
        })
    }

    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    pub fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    fn draw_value<R: Rng>(sampler: &CoordinateSampler, attribute: &Attribute, rng: &mut R) -> Result<Value> {
        let coordinate = sampler.draw(rng)?;
        coordinate
            .value_of(attribute.name())
            .cloned()
            .ok_or_else(|| SynthError::UnknownDimension {
                attribute: attribute.name().to_string(),
                matrix: "an inner sampler".to_string(),
            })
    }
}

impl Sampler for HierarchicalSampler {
    type Output = Coordinate;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        let mut drawn: BTreeMap<&Attribute, Value> = BTreeMap::new();
        for attribute in self.tree.order() {
            let value = match self.tree.parent(attribute) {
                None => {
                    let sampler = self
                        .roots
                        .get(attribute)
                        .ok_or(SynthError::Unconfigured("HierarchicalSampler"))?;
                    Self::draw_value(sampler, attribute, rng)?
                }
                Some(parent) => {
                    let parent_value = drawn
                        .get(parent)
                        .ok_or(SynthError::Unconfigured("HierarchicalSampler"))?;
                    let sampler = self
                        .conditionals
                        .get(attribute)
                        .and_then(|by_parent| by_parent.get(parent_value))
                        .ok_or_else(|| SynthError::ZeroConditionalMass {
                            attribute: attribute.name().to_string(),
                            parent_value: parent_value.to_string(),
                        })?;
                    Self::draw_value(sampler, attribute, rng)?
                }
            };
            drawn.insert(attribute, value);
        }
        Coordinate::new(drawn.into_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::NDimensionalMatrix;
    use u_numflow::random::create_rng;

    fn table(attribute: &Attribute, cells: &[(&str, f64)]) -> NDimensionalMatrix {
        let mut m = NDimensionalMatrix::contingency(attribute.name(), vec![attribute.clone()]);
        for (label, n) in cells {
            m.add_value(&Coordinate::of(&[(attribute, *label)]).unwrap(), *n)
                .unwrap();
        }
        m
    }

    fn hypothesis(size: &Attribute, cars: &Attribute, with_large: bool) -> HierarchicalHypothesis {
        let tree =
            DependencyTree::new(&[(size.clone(), None), (cars.clone(), Some(size.clone()))]).unwrap();
        let mut h = HierarchicalHypothesis::new(tree);
        h.set_root_marginal(table(size, &[("small", 1.0), ("large", 1.0)]))
            .unwrap();
        h.set_conditional(size.value_of("small").unwrap(), table(cars, &[("0", 1.0)]))
            .unwrap();
        if with_large {
            h.set_conditional(size.value_of("large").unwrap(), table(cars, &[("2", 1.0)]))
                .unwrap();
        }
        h
    }

    #[test]
    fn test_children_follow_parent() {
        let size = Attribute::ordinal("Size", &["small", "large"]).unwrap();
        let cars = Attribute::integer("Cars", 0..=2).unwrap();
        let sampler = HierarchicalSampler::new(&hypothesis(&size, &cars, true), SamplerKind::Alias).unwrap();
        assert_eq!(sampler.dimensions().len(), 2);

        let mut rng = create_rng(42);
        for c in sampler.draw_n(500, &mut rng).unwrap() {
            let s = c.value_of("Size").unwrap().label().to_string();
            let n = c.value_of("Cars").unwrap().label().to_string();
            match s.as_str() {
                "small" => assert_eq!(n, "0"),
                _ => assert_eq!(n, "2"),
            }
        }
    }

    #[test]
    fn test_zero_conditional_mass() {
        let size = Attribute::ordinal("Size", &["small", "large"]).unwrap();
        let cars = Attribute::integer("Cars", 0..=2).unwrap();
        let sampler =
            HierarchicalSampler::new(&hypothesis(&size, &cars, false), SamplerKind::Basic).unwrap();

        let mut rng = create_rng(3);
        let errors: Vec<SynthError> = (0..200)
            .filter_map(|_| sampler.draw(&mut rng).err())
            .collect();
        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .all(|e| matches!(e, SynthError::ZeroConditionalMass { parent_value, .. } if parent_value == "large")));
    }
}
