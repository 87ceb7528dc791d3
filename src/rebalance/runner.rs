//! Rebalancing loop.
//!
//! # Algorithm
//!
//! For each unplaced house:
//!
//! 1. Pick the battery with the most remaining energy as destination.
//! 2. Move low-priority houses off the destination onto any helper battery
//!    with room, re-checking after every move.
//! 3. Otherwise, per helper, repeatedly swap the destination/helper pair
//!    that frees the most destination capacity without overloading the
//!    helper, then re-check.
//! 4. If nothing frees enough room the house stays unplaced.

use super::config::RebalanceConfig;
use crate::error::GridResult;
use crate::model::{BatteryId, Grid, HouseId};
use tracing::{debug, info, warn};

/// Outcome of a rebalancing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebalanceResult {
    /// Previously unplaced houses that now have a battery.
    pub placed: Vec<HouseId>,
    /// Houses that still have no battery.
    pub unplaced: Vec<HouseId>,
    /// Single-house moves performed.
    pub moves: usize,
    /// Pairwise swaps performed.
    pub swaps: usize,
}

impl RebalanceResult {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Frees battery capacity for houses the greedy pass could not place.
pub struct Rebalancer;

impl Rebalancer {
    /// Tries to place each house in `unplaced`, in order.
    pub fn run(
        grid: &mut Grid,
        unplaced: &[HouseId],
        config: &RebalanceConfig,
    ) -> GridResult<RebalanceResult> {
        config.validate()?;

        let mut result = RebalanceResult::default();
        for &house in unplaced {
            if grid.house(house).battery().is_some() {
                continue;
            }
            if Self::place(grid, house, config, &mut result)? {
                result.placed.push(house);
            } else {
                warn!(
                    house = grid.house(house).id,
                    energy = grid.house(house).energy,
                    "no rebalancing frees enough capacity"
                );
                result.unplaced.push(house);
            }
        }

        info!(
            placed = result.placed.len(),
            unplaced = result.unplaced.len(),
            moves = result.moves,
            swaps = result.swaps,
            "rebalancing done"
        );
        Ok(result)
    }

    fn place(
        grid: &mut Grid,
        house: HouseId,
        config: &RebalanceConfig,
        result: &mut RebalanceResult,
    ) -> GridResult<bool> {
        let mut order: Vec<BatteryId> = grid.battery_ids().collect();
        order.sort_by(|a, b| {
            grid.battery(*b)
                .remaining()
                .total_cmp(&grid.battery(*a).remaining())
        });
        let Some((&dest, helpers)) = order.split_first() else {
            return Ok(false);
        };

        if Self::try_accept(grid, dest, house)? {
            return Ok(true);
        }
        if Self::move_phase(grid, dest, helpers, house, config, result)? {
            return Ok(true);
        }
        Self::swap_phase(grid, dest, helpers, house, config, result)
    }

    /// Connects `house` to `dest` if it fits now.
    fn try_accept(grid: &mut Grid, dest: BatteryId, house: HouseId) -> GridResult<bool> {
        if grid.house(house).check_connection(grid.battery(dest)) {
            grid.add_house(dest, house)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn move_phase(
        grid: &mut Grid,
        dest: BatteryId,
        helpers: &[BatteryId],
        house: HouseId,
        config: &RebalanceConfig,
        result: &mut RebalanceResult,
    ) -> GridResult<bool> {
        for &helper in helpers {
            for candidate in grid.battery(dest).low_priority(config.window) {
                if !grid.house(candidate).check_connection(grid.battery(helper)) {
                    continue;
                }
                grid.move_house(dest, helper, candidate)?;
                result.moves += 1;
                debug!(
                    house = grid.house(candidate).id,
                    from = grid.battery(dest).id,
                    to = grid.battery(helper).id,
                    "moved house"
                );
                if Self::try_accept(grid, dest, house)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn swap_phase(
        grid: &mut Grid,
        dest: BatteryId,
        helpers: &[BatteryId],
        house: HouseId,
        config: &RebalanceConfig,
        result: &mut RebalanceResult,
    ) -> GridResult<bool> {
        for &helper in helpers {
            while let Some((k, l)) = Self::best_swap(grid, dest, helper, config.window) {
                grid.remove_house(dest, k)?;
                grid.remove_house(helper, l)?;
                grid.add_house(helper, k)?;
                grid.add_house(dest, l)?;
                result.swaps += 1;
                debug!(
                    out = grid.house(k).id,
                    back = grid.house(l).id,
                    dest = grid.battery(dest).id,
                    helper = grid.battery(helper).id,
                    "swapped houses"
                );
            }
            if Self::try_accept(grid, dest, house)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The `(k on dest, l on helper)` pair maximizing `k.energy - l.energy`,
    /// where the gain is positive and fits in the helper's remaining energy.
    fn best_swap(
        grid: &Grid,
        dest: BatteryId,
        helper: BatteryId,
        window: usize,
    ) -> Option<(HouseId, HouseId)> {
        let capacity = grid.battery(helper).remaining();
        let from_dest = grid.battery(dest).low_priority(window);
        let from_helper = grid.battery(helper).low_priority(window);

        let mut best = None;
        let mut max_change = 0.0;
        for &k in &from_dest {
            for &l in &from_helper {
                let change = grid.house(k).energy - grid.house(l).energy;
                if change > max_change && change <= capacity {
                    max_change = change;
                    best = Some((k, l));
                }
            }
        }
        best
    }
}
