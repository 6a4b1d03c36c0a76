//! IPF fitting loop.
//!
//! # Algorithm
//!
//! 1. Normalize the seed and every control to frequencies
//! 2. For each pass, for each control:
//!    a. Compute the current marginal of the fitted table over the
//!       control's attributes
//!    b. Rescale every cell by `target / current` of its projection
//! 3. Stop when the largest relative cell change of a pass drops below the
//!    threshold, or after the iteration budget
//!
//! # Reference
//!
//! Deming, W. E. & Stephan, F. F. (1940). "On a least squares adjustment of
//! a sampled frequency table when the expected marginal totals are known",
//! *Annals of Mathematical Statistics* 11(4), 427-444.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::config::IpfConfig;
use crate::attribute::Attribute;
use crate::error::{Result, SynthError};
use crate::matrix::{Coordinate, MatrixKind, NDimensionalMatrix};

/// Result of an IPF run.
///
/// Non-convergence is not an error: `converged` is `false` and `matrix`
/// holds the last fitted table.
#[derive(Debug, Clone)]
pub struct IpfResult {
    /// Fitted global frequency table over the seed's dimensions.
    pub matrix: NDimensionalMatrix,

    /// Number of passes executed.
    pub iterations: usize,

    /// Whether the convergence threshold was reached.
    pub converged: bool,

    /// Largest relative cell change of the last pass.
    pub max_delta: f64,

    /// Largest relative cell change of every pass.
    pub delta_history: Vec<f64>,
}

struct Control {
    dimensions: Vec<Attribute>,
    targets: BTreeMap<Coordinate, f64>,
}

/// Iterative Proportional Fitting of a seed matrix to marginal controls.
pub struct IterativeProportionalFitting;

impl IterativeProportionalFitting {
    /// Fits `seed` to `controls`.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    /// - `UnknownDimension` if a control spans an attribute the seed lacks
    /// - `InvalidDistribution` if there are no controls, the seed or a
    ///   control is empty, or fitting removes all mass
    pub fn run(
        seed: &NDimensionalMatrix,
        controls: &[NDimensionalMatrix],
        config: &IpfConfig,
    ) -> Result<IpfResult> {
        config.validate().map_err(SynthError::InvalidConfig)?;
        if controls.is_empty() {
            return Err(SynthError::InvalidDistribution(
                "IPF needs at least one control".into(),
            ));
        }

        let controls = controls
            .iter()
            .map(|control| prepare_control(seed, control))
            .collect::<Result<Vec<_>>>()?;

        let seed_frequencies = seed.to_frequencies()?;
        let mut fitted: BTreeMap<Coordinate, f64> = seed_frequencies
            .iter()
            .map(|(c, cell)| (c.clone(), cell.value()))
            .collect();

        let mut delta_history = Vec::with_capacity(config.max_iterations);
        let mut converged = false;

        for iteration in 1..=config.max_iterations {
            let previous = fitted.clone();
            for control in &controls {
                fit_control(&mut fitted, control);
            }
            fitted.retain(|_, v| *v > 0.0);

            let delta = max_relative_change(&previous, &fitted);
            delta_history.push(delta);
            debug!("ipf pass {iteration}: max relative change {delta:.3e}");

            if delta < config.convergence_threshold {
                converged = true;
                break;
            }
        }

        let iterations = delta_history.len();
        let max_delta = delta_history.last().copied().unwrap_or(0.0);

        let mut matrix = NDimensionalMatrix::new(
            &format!("ipf({})", seed.label()),
            MatrixKind::GlobalFrequencyTable,
            seed.dimensions().to_vec(),
        );
        for (coordinate, v) in fitted {
            matrix.set_unchecked(coordinate, v);
        }
        if matrix.is_empty() {
            return Err(SynthError::InvalidDistribution(
                "IPF removed all mass: seed and controls share no support".into(),
            ));
        }
        matrix.normalize()?;

        if converged {
            info!("ipf converged after {iterations} passes (delta {max_delta:.3e})");
        } else {
            warn!(
                "ipf did not converge within {} passes (delta {max_delta:.3e} >= {:.3e})",
                config.max_iterations, config.convergence_threshold
            );
        }

        Ok(IpfResult {
            matrix,
            iterations,
            converged,
            max_delta,
            delta_history,
        })
    }
}

fn prepare_control(seed: &NDimensionalMatrix, control: &NDimensionalMatrix) -> Result<Control> {
    for d in control.dimensions() {
        if !seed.has_dimension(d.name()) {
            return Err(SynthError::UnknownDimension {
                attribute: d.name().to_string(),
                matrix: format!("seed matrix '{}'", seed.label()),
            });
        }
    }
    let frequencies = control.to_frequencies()?;
    Ok(Control {
        dimensions: control.dimensions().to_vec(),
        targets: frequencies
            .iter()
            .map(|(c, cell)| (c.clone(), cell.value()))
            .collect(),
    })
}

fn fit_control(fitted: &mut BTreeMap<Coordinate, f64>, control: &Control) {
    let mut current: BTreeMap<Coordinate, f64> = BTreeMap::new();
    for (coordinate, v) in fitted.iter() {
        *current
            .entry(coordinate.project(&control.dimensions))
            .or_insert(0.0) += v;
    }
    for (coordinate, v) in fitted.iter_mut() {
        let key = coordinate.project(&control.dimensions);
        let now = current.get(&key).copied().unwrap_or(0.0);
        let target = control.targets.get(&key).copied().unwrap_or(0.0);
        *v = if now > 0.0 { *v * target / now } else { 0.0 };
    }
}

fn max_relative_change(previous: &BTreeMap<Coordinate, f64>, fitted: &BTreeMap<Coordinate, f64>) -> f64 {
    previous
        .iter()
        .map(|(coordinate, &old)| {
            let new = fitted.get(coordinate).copied().unwrap_or(0.0);
            (new - old).abs() / old
        })
        .fold(0.0, f64::max)
}
