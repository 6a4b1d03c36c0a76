//! Distance indicators between an objective matrix and a candidate.

use std::collections::BTreeSet;

use super::critical::chi_squared_critical;
use crate::entity::Population;
use crate::error::{Result, SynthError};
use crate::matrix::{Coordinate, NDimensionalMatrix};

/// Goodness-of-fit indicator. Lower is better; 0 is a perfect fit.
///
/// The objective is the reference. Against a frequency objective the
/// candidate is compared as frequencies (divided by its own total);
/// against a contingency objective it is compared as raw counts. Cells are
/// taken over the union of both tables' non-zero coordinates, and
/// `nCells` is the number of non-zero objective cells.
///
/// - `Tae`: Σ|o − e|
/// - `Aapd`: TAE / nCells
/// - `Srmse`: √(Σ(o − e)² / nCells) / S, with S = Σo² / nCells for
///   frequency objectives and the objective grand total for counts
/// - `Rssz`: Σ (e − r)² / (r(1 − r/N)) / χ²₀.₉₅(nCells), on the count
///   scale of the candidate (N = candidate total, r = objective frequency ×
///   N)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Indicator {
    /// Total absolute error.
    Tae,
    /// Average absolute percentage difference.
    Aapd,
    /// Standardized root mean square error.
    #[default]
    Srmse,
    /// Modified relative sum of squared Z-scores.
    Rssz,
}

impl Indicator {
    pub fn name(self) -> &'static str {
        match self {
            Indicator::Tae => "TAE",
            Indicator::Aapd => "AAPD",
            Indicator::Srmse => "SRMSE",
            Indicator::Rssz => "RSSZ*",
        }
    }

    /// Distance between an objective and a same-shaped candidate table.
    ///
    /// # Errors
    /// `Usage` if the dimension sets differ, `InvalidDistribution` for an
    /// empty objective (or an empty candidate under `Rssz`).
    pub fn evaluate(self, objective: &NDimensionalMatrix, candidate: &NDimensionalMatrix) -> Result<f64> {
        if objective.dimensions() != candidate.dimensions() {
            return Err(SynthError::Usage(format!(
                "candidate '{}' does not span the dimensions of objective '{}'",
                candidate.label(),
                objective.label()
            )));
        }
        let n_cells = objective.size();
        if n_cells == 0 {
            return Err(SynthError::InvalidDistribution(format!(
                "objective '{}' has no cells",
                objective.label()
            )));
        }
        let n = n_cells as f64;
        let keys: BTreeSet<&Coordinate> = objective
            .iter()
            .map(|(c, _)| c)
            .chain(candidate.iter().map(|(c, _)| c))
            .collect();

        match self {
            Indicator::Tae => Ok(scaled_pairs(objective, candidate, &keys)?
                .into_iter()
                .map(|(o, e)| (o - e).abs())
                .sum()),
            Indicator::Aapd => Ok(Indicator::Tae.evaluate(objective, candidate)? / n),
            Indicator::Srmse => {
                let squared: f64 = scaled_pairs(objective, candidate, &keys)?
                    .into_iter()
                    .map(|(o, e)| (o - e).powi(2))
                    .sum();
                let s = if objective.kind().is_frequency() {
                    objective.iter().map(|(_, c)| c.value().powi(2)).sum::<f64>() / n
                } else {
                    objective.total()
                };
                if s <= 0.0 {
                    return Err(SynthError::InvalidDistribution(format!(
                        "objective '{}' has no mass",
                        objective.label()
                    )));
                }
                Ok((squared / n).sqrt() / s)
            }
            Indicator::Rssz => rssz(objective, candidate, &keys, n_cells),
        }
    }

    /// Distance between an objective and a population, tabulated over the
    /// objective's dimensions.
    pub fn evaluate_population(self, objective: &NDimensionalMatrix, population: &Population) -> Result<f64> {
        let candidate = population.contingency_table(objective.dimensions());
        self.evaluate(objective, &candidate)
    }
}

/// `(objective, candidate)` cell pairs with the candidate on the
/// objective's scale.
fn scaled_pairs(
    objective: &NDimensionalMatrix,
    candidate: &NDimensionalMatrix,
    keys: &BTreeSet<&Coordinate>,
) -> Result<Vec<(f64, f64)>> {
    let total = candidate.total();
    let factor = if !objective.kind().is_frequency() {
        1.0
    } else if total > 0.0 {
        1.0 / total
    } else {
        0.0
    };
    let mut pairs = Vec::with_capacity(keys.len());
    for key in keys {
        let o = objective.get_val(key)?.value();
        let e = candidate.get_val(key)?.value() * factor;
        pairs.push((o, e));
    }
    Ok(pairs)
}

fn rssz(
    objective: &NDimensionalMatrix,
    candidate: &NDimensionalMatrix,
    keys: &BTreeSet<&Coordinate>,
    n_cells: usize,
) -> Result<f64> {
    let population = candidate.total();
    let reference_total = objective.total();
    if population <= 0.0 || reference_total <= 0.0 {
        return Err(SynthError::InvalidDistribution(
            "RSSZ* needs non-empty objective and candidate tables".into(),
        ));
    }
    let mut sum = 0.0;
    for key in keys {
        let r = objective.get_val(key)?.value() / reference_total * population;
        let e = candidate.get_val(key)?.value();
        let mut variance = r * (1.0 - r / population);
        if variance <= 0.0 {
            variance = 1.0;
        }
        sum += (e - r).powi(2) / variance;
    }
    Ok(sum / chi_squared_critical(n_cells)?)
}
