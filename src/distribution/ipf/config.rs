//! IPF configuration.

/// Configuration for Iterative Proportional Fitting.
///
/// # Examples
///
/// ```
/// use u_synthpop::distribution::IpfConfig;
///
/// let config = IpfConfig::default()
///     .with_max_iterations(200)
///     .with_convergence_threshold(1e-9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IpfConfig {
    /// Maximum number of passes (one pass sweeps every control once).
    pub max_iterations: usize,

    /// The fit converges when the largest relative cell change of a pass
    /// drops below this value.
    pub convergence_threshold: f64,
}

impl Default for IpfConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-6,
        }
    }
}

impl IpfConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if !(self.convergence_threshold > 0.0 && self.convergence_threshold.is_finite()) {
            return Err(format!(
                "convergence_threshold must be positive, got {}",
                self.convergence_threshold
            ));
        }
        Ok(())
    }
}
