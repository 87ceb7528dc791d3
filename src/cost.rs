//! Infrastructure cost model.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit prices for cables and batteries.
///
/// # Examples
///
/// ```
/// use u_smartgrid::cost::{Cost, CostModel};
///
/// let model = CostModel::default();
/// assert_eq!(model.total(10, 5), Cost::Feasible(25_090));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    /// Price per grid cell of cable.
    pub cable_cost: i64,
    /// Fixed price per battery.
    pub battery_cost: i64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cable_cost: 9,
            battery_cost: 5000,
        }
    }
}

impl CostModel {
    pub fn with_cable_cost(mut self, cost: i64) -> Self {
        self.cable_cost = cost;
        self
    }

    pub fn with_battery_cost(mut self, cost: i64) -> Self {
        self.battery_cost = cost;
        self
    }

    /// `cable_cost × cables + battery_cost × batteries`.
    pub fn total(&self, cables: usize, batteries: usize) -> Cost {
        Cost::Feasible(self.cable_cost * cables as i64 + self.battery_cost * batteries as i64)
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.cable_cost < 0 || self.battery_cost < 0 {
            return Err(GridError::Config(format!(
                "costs must be non-negative, got cable {} battery {}",
                self.cable_cost, self.battery_cost
            )));
        }
        Ok(())
    }
}

/// Total cost of a layout.
///
/// `Infeasible` is the sentinel for runs that left houses unplaced; it
/// compares greater than every feasible cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cost {
    Feasible(i64),
    Infeasible,
}

impl Cost {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Cost::Feasible(_))
    }

    pub fn value(&self) -> Option<i64> {
        match *self {
            Cost::Feasible(v) => Some(v),
            Cost::Infeasible => None,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Feasible(v) => write!(f, "{v}"),
            Cost::Infeasible => f.write_str("infeasible"),
        }
    }
}
