//! Greedy capacity-constrained assignment.

use super::priority::{compute_priorities, placement_order};
use crate::error::GridResult;
use crate::model::{BatteryId, Grid, HouseId};
use tracing::{debug, info};

/// Outcome of the greedy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignResult {
    /// Houses connected, in placement order.
    pub placed: Vec<HouseId>,
    /// Houses no battery had room for, in placement order.
    pub unplaced: Vec<HouseId>,
}

/// Places houses one at a time on the nearest battery with room left.
pub struct Assigner;

impl Assigner {
    /// Scores, orders and assigns every unplaced house on `grid`.
    ///
    /// Houses that fit nowhere are returned in
    /// [`AssignResult::unplaced`] for the rebalancer; this pass never fails
    /// on capacity.
    pub fn run(grid: &mut Grid) -> GridResult<AssignResult> {
        compute_priorities(grid);

        let mut result = AssignResult::default();
        for house in placement_order(grid) {
            if grid.house(house).battery().is_some() {
                continue;
            }
            match Self::nearest_with_room(grid, house) {
                Some(battery) => {
                    grid.add_house(battery, house)?;
                    result.placed.push(house);
                }
                None => {
                    debug!(house = grid.house(house).id, "no battery has room");
                    result.unplaced.push(house);
                }
            }
        }

        info!(
            placed = result.placed.len(),
            unplaced = result.unplaced.len(),
            "greedy assignment done"
        );
        Ok(result)
    }

    /// The closest battery, in input order on ties, that can take `house`.
    pub fn nearest_with_room(grid: &Grid, house: HouseId) -> Option<BatteryId> {
        let h = grid.house(house);
        let mut best: Option<(u32, BatteryId)> = None;
        for (i, battery) in grid.batteries().iter().enumerate() {
            if !h.check_connection(battery) {
                continue;
            }
            let dist = h.distance(battery);
            if best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, BatteryId(i)));
            }
        }
        best.map(|(_, id)| id)
    }
}
