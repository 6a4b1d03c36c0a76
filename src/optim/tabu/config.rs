//! Tabu Search configuration.

/// Configuration parameters for Tabu Search.
///
/// # Examples
///
/// ```
/// use u_synthpop::optim::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_max_iterations(300)
///     .with_max_tabu_size(40);
/// assert_eq!(config.stall_limit(), 4);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Capacity of the FIFO memory of visited solutions.
    pub max_tabu_size: usize,
    /// Stop as soon as the best fitness is at or below this value.
    pub fitness_threshold: f64,
    /// Buffer of the neighborhood evaluated each iteration.
    pub buffer: usize,
    /// Buffer of the random jump made after a stall.
    pub diversification_buffer: usize,
    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_tabu_size: 50,
            fitness_threshold: 0.0,
            buffer: 1,
            diversification_buffer: 5,
            seed: None,
        }
    }
}

impl TabuConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_max_tabu_size(mut self, n: usize) -> Self {
        self.max_tabu_size = n;
        self
    }

    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = threshold;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_diversification_buffer(mut self, buffer: usize) -> Self {
        self.diversification_buffer = buffer;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Iterations without a new global best before a diversification jump.
    pub fn stall_limit(&self) -> usize {
        (self.max_tabu_size / 10).max(1)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be positive".into());
        }
        if self.max_tabu_size == 0 {
            return Err("max_tabu_size must be positive".into());
        }
        if !self.fitness_threshold.is_finite() || self.fitness_threshold < 0.0 {
            return Err(format!(
                "fitness_threshold must be finite and non-negative, got {}",
                self.fitness_threshold
            ));
        }
        if self.buffer == 0 {
            return Err("buffer must be at least 1".into());
        }
        if self.diversification_buffer < self.buffer {
            return Err(format!(
                "diversification_buffer ({}) must not be smaller than buffer ({})",
                self.diversification_buffer, self.buffer
            ));
        }
        Ok(())
    }
}
