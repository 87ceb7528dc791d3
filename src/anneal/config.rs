//! Annealer configuration and cooling schedules.

use crate::error::{GridError, GridResult};

/// Rule for lowering the probability of accepting a non-improving move.
///
/// The schedule runs once per evaluated move, independent of the cost
/// delta.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoolingSchedule {
    /// `p_{k+1} = alpha * p_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// `p_k = p_0 - k * (p_0 - p_min) / iterations`.
    Linear,

    /// `p_{k+1} = p_k / (1 + beta * p_k)`.
    ///
    /// Cools fast while the probability is high and slowly near zero.
    LundyMees {
        /// Cooling parameter; must be positive.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::LundyMees { beta: 0.1 }
    }
}

/// Configuration for the [`Annealer`](super::Annealer).
///
/// # Examples
///
/// ```
/// use u_smartgrid::anneal::{AnnealConfig, CoolingSchedule};
///
/// let config = AnnealConfig::default()
///     .with_iterations(2000)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.99 })
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AnnealConfig {
    /// Number of proposed moves, skipped ones included.
    pub iterations: usize,

    /// Acceptance probability for non-improving moves before any cooling.
    pub initial_probability: f64,

    /// Floor for the linear schedule.
    pub min_probability: f64,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            initial_probability: 1.0,
            min_probability: 0.0,
            cooling: CoolingSchedule::default(),
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_initial_probability(mut self, p: f64) -> Self {
        self.initial_probability = p;
        self
    }

    pub fn with_min_probability(mut self, p: f64) -> Self {
        self.min_probability = p;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GridResult<()> {
        if !(0.0..=1.0).contains(&self.initial_probability) {
            return Err(GridError::Config(format!(
                "initial_probability must be in [0, 1], got {}",
                self.initial_probability
            )));
        }
        if self.min_probability < 0.0 || self.min_probability > self.initial_probability {
            return Err(GridError::Config(format!(
                "min_probability must be in [0, {}], got {}",
                self.initial_probability, self.min_probability
            )));
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha <= 0.0 || alpha >= 1.0 {
                    return Err(GridError::Config(format!(
                        "geometric alpha must be in (0, 1), got {alpha}"
                    )));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if beta <= 0.0 {
                    return Err(GridError::Config(format!(
                        "lundy-mees beta must be positive, got {beta}"
                    )));
                }
            }
            CoolingSchedule::Linear => {}
        }
        Ok(())
    }

    /// Applies one cooling step. `step` counts previous cooling steps.
    pub fn cool(&self, probability: f64, step: usize) -> f64 {
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => probability * alpha,

            CoolingSchedule::Linear => {
                if self.iterations == 0 {
                    self.min_probability
                } else {
                    let p = self.initial_probability
                        - (step + 1) as f64 * (self.initial_probability - self.min_probability)
                            / self.iterations as f64;
                    p.max(self.min_probability)
                }
            }

            CoolingSchedule::LundyMees { beta } => probability / (1.0 + beta * probability),
        }
    }
}
