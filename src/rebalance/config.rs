//! Rebalancer configuration.

use crate::error::{GridError, GridResult};

/// Configuration for the [`Rebalancer`](super::Rebalancer).
///
/// # Examples
///
/// ```
/// use u_smartgrid::rebalance::RebalanceConfig;
///
/// let config = RebalanceConfig::default().with_window(5);
/// assert_eq!(config.window, 5);
/// ```
#[derive(Debug, Clone)]
pub struct RebalanceConfig {
    /// How many of a battery's lowest-priority houses are considered for
    /// moves and swaps.
    pub window: usize,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl RebalanceConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GridResult<()> {
        if self.window == 0 {
            return Err(GridError::Config("rebalance window must be positive".into()));
        }
        Ok(())
    }
}
