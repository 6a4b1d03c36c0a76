//! Hill climbing configuration.

/// Configuration for [`HillClimbingRunner`](super::HillClimbingRunner).
///
/// # Examples
///
/// ```
/// use u_synthpop::optim::HillClimbingConfig;
///
/// let config = HillClimbingConfig::default()
///     .with_max_iterations(500)
///     .with_fitness_threshold(0.01)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HillClimbingConfig {
    /// Maximum number of neighbor evaluations.
    pub max_iterations: usize,
    /// Stop as soon as the best fitness is at or below this value.
    pub fitness_threshold: f64,
    /// Neighbor buffer at the initial fitness; shrinks towards 1 as fitness
    /// improves.
    pub max_buffer: usize,
    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for HillClimbingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            fitness_threshold: 0.0,
            max_buffer: 4,
            seed: None,
        }
    }
}

impl HillClimbingConfig {
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

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
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
        Ok(())
    }
}
