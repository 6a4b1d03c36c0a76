//! SA configuration and cooling schedules.

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// `T_{k+1} = alpha * T_k`, with `alpha` in (0, 1).
    Geometric { alpha: f64 },

    /// `T_k = T_0 - k * (T_0 - T_min) / steps`, where `steps` is
    /// `max_iterations / iterations_per_temperature`.
    Linear,

    /// `T_{k+1} = T_k / (1 + beta * T_k)`, one iteration per temperature.
    LundyMees { beta: f64 },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Configuration for [`SaRunner`](super::SaRunner).
///
/// Temperatures are on the fitness scale: a worse neighbor with fitness
/// delta `d` is accepted with probability `exp(-d / T)`.
///
/// # Examples
///
/// ```
/// use u_synthpop::optim::{CoolingSchedule, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(2.0)
///     .with_min_temperature(0.001)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
///     .with_iterations_per_temperature(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Starting temperature, in fitness units.
    pub initial_temperature: f64,

    /// The run stops when the temperature drops to this value.
    pub min_temperature: f64,

    pub cooling: CoolingSchedule,

    /// Iterations at each temperature level (ignored by `LundyMees`).
    /// The default of 1 cools after every iteration.
    pub iterations_per_temperature: usize,

    /// Maximum total iterations.
    pub max_iterations: usize,

    /// Stop as soon as the best fitness is at or below this value.
    pub fitness_threshold: f64,

    /// Neighbor buffer at the initial fitness; shrinks as the current
    /// fitness improves.
    pub max_buffer: usize,

    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            min_temperature: 1e-4,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 1,
            max_iterations: 1000,
            fitness_threshold: 0.0,
            max_buffer: 4,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = threshold;
        self
    }

    pub fn with_max_buffer(mut self, buffer: usize) -> Self {
        self.max_buffer = buffer;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks temperatures, budgets and schedule parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_temperature > 0.0 && self.min_temperature < self.initial_temperature) {
            return Err(format!(
                "temperatures must satisfy 0 < min ({}) < initial ({})",
                self.min_temperature, self.initial_temperature
            ));
        }
        if self.iterations_per_temperature == 0 {
            return Err("iterations_per_temperature must be positive".into());
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be positive".into());
        }
        if !self.fitness_threshold.is_finite() || self.fitness_threshold < 0.0 {
            return Err(format!(
                "fitness_threshold must be finite and non-negative, got {}",
                self.fitness_threshold
            ));
        }
        if self.max_buffer == 0 {
            return Err("max_buffer must be at least 1".into());
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } if !(alpha > 0.0 && alpha < 1.0) => {
                Err(format!("cooling factor {alpha} is outside (0, 1)"))
            }
            CoolingSchedule::LundyMees { beta } if beta <= 0.0 => {
                Err(format!("cooling parameter {beta} must be positive"))
            }
            _ => Ok(()),
        }
    }
}
