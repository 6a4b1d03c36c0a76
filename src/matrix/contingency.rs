//! Population → contingency table conversion.
//!
//! The matrix is a derived view of the population and is never written back
//! onto entities. With the `parallel` feature, chunks of the population are
//! counted independently and merged by plain addition.

use std::collections::BTreeMap;

use super::cell::MatrixKind;
use super::coordinate::Coordinate;
use super::ndmatrix::{join_names, NDimensionalMatrix};
use crate::attribute::Attribute;
use crate::entity::{Entity, Population};

#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 4096;

impl NDimensionalMatrix {
    /// Counts the entities of `population` per coordinate over `dimensions`.
    ///
    /// Entities lacking one of the dimensions (or holding its empty value)
    /// are not counted.
    pub fn from_population(dimensions: &[Attribute], population: &Population) -> Self {
        let mut matrix = NDimensionalMatrix::new(
            &format!("population | {}", join_names(dimensions)),
            MatrixKind::ContingencyTable,
            dimensions.to_vec(),
        );
        for (coordinate, n) in count(dimensions, population.entities()) {
            matrix.set_unchecked(coordinate, n as f64);
        }
        matrix
    }
}

impl Population {
    /// Contingency table of this population over `dimensions`.
    pub fn contingency_table(&self, dimensions: &[Attribute]) -> NDimensionalMatrix {
        NDimensionalMatrix::from_population(dimensions, self)
    }
}

fn count_chunk(dimensions: &[Attribute], entities: &[Entity]) -> BTreeMap<Coordinate, u64> {
    let mut counts = BTreeMap::new();
    for entity in entities {
        if let Some(coordinate) = entity.coordinate(dimensions) {
            *counts.entry(coordinate).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(not(feature = "parallel"))]
fn count(dimensions: &[Attribute], entities: &[Entity]) -> BTreeMap<Coordinate, u64> {
    count_chunk(dimensions, entities)
}

#[cfg(feature = "parallel")]
fn count(dimensions: &[Attribute], entities: &[Entity]) -> BTreeMap<Coordinate, u64> {
    use rayon::prelude::*;

    if entities.len() < PARALLEL_CHUNK {
        return count_chunk(dimensions, entities);
    }
    entities
        .par_chunks(PARALLEL_CHUNK)
        .map(|chunk| count_chunk(dimensions, chunk))
        .reduce(BTreeMap::new, |mut left, right| {
            for (coordinate, n) in right {
                *left.entry(coordinate).or_insert(0) += n;
            }
            left
        })
}
