//! Cable routing driver.

use super::direct::lay_direct;
use super::geometry::unique_in_order;
use super::merge::merge_all;
use super::trace::trace_house_cables;
use crate::error::{GridError, GridResult};
use crate::model::{BatteryId, Grid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How cables are laid once houses are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingStrategy {
    /// Houses on the same battery share one merged cable tree.
    #[default]
    Shared,
    /// Every house has its own cable run to its battery.
    Direct,
}

impl RoutingStrategy {
    /// Key used for the cost entry in the layout report.
    pub fn cost_key(&self) -> &'static str {
        match self {
            RoutingStrategy::Shared => "costs-shared",
            RoutingStrategy::Direct => "costs-own",
        }
    }
}

/// Turns an assignment into laid cables.
pub struct Router;

impl Router {
    /// Re-routes the whole grid from scratch and returns the cable count.
    ///
    /// Existing cables and merged fragments are discarded first, so this can
    /// be called repeatedly on the same grid.
    pub fn route_all(grid: &mut Grid, strategy: RoutingStrategy) -> GridResult<usize> {
        grid.reset_routes();
        let cables = match strategy {
            RoutingStrategy::Shared => {
                let mut total = 0;
                for battery in grid.battery_ids().collect::<Vec<_>>() {
                    merge_all(grid.battery_mut(battery));
                    total += Self::lay_cables(grid, battery)?;
                }
                total
            }
            RoutingStrategy::Direct => lay_direct(grid)?,
        };
        debug!(cables, ?strategy, "routing done");
        Ok(cables)
    }

    /// Creates one cable per distinct cell of `battery`'s merged path.
    ///
    /// Fails if the battery's fragments have not been merged into one.
    pub fn lay_cables(grid: &mut Grid, battery: BatteryId) -> GridResult<usize> {
        let b = grid.battery(battery);
        let path = b.merged_path().ok_or_else(|| {
            GridError::InvariantViolation(format!(
                "battery {} still has {} path fragments",
                b.id,
                b.fragment_count()
            ))
        })?;
        let cells = unique_in_order(path.iter().copied());
        let count = cells.len();
        for point in cells {
            grid.push_cable(battery, point, None);
        }
        Ok(count)
    }

    /// Records on every house the cables leading from it to its battery.
    ///
    /// Only needed for reporting; direct routing attributes cables while
    /// laying them.
    pub fn attribute_cables(grid: &mut Grid, strategy: RoutingStrategy) -> GridResult<()> {
        match strategy {
            RoutingStrategy::Shared => trace_house_cables(grid),
            RoutingStrategy::Direct => Ok(()),
        }
    }
}
