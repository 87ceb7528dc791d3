//! Baseline sampling configuration.

use crate::cost::CostModel;
use crate::error::{GridError, GridResult};

/// Configuration for [`RandomBaseline::sample`](super::RandomBaseline::sample).
///
/// # Examples
///
/// ```
/// use u_smartgrid::baseline::BaselineConfig;
///
/// let config = BaselineConfig::default().with_runs(200).with_seed(1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BaselineConfig {
    /// Number of independent random layouts.
    pub runs: usize,

    pub cost: CostModel,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            runs: 1000,
            cost: CostModel::default(),
            seed: None,
        }
    }
}

impl BaselineConfig {
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.runs == 0 {
            return Err(GridError::Config("baseline runs must be positive".into()));
        }
        self.cost.validate()
    }
}
