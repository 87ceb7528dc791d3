//! Placement priority.
//!
//! A house whose nearest battery is much closer than its alternatives has
//! few good options and should be placed before houses that can go almost
//! anywhere.

use crate::model::{Grid, HouseId};

/// Rank (0-based) of the alternative battery compared against the nearest.
pub const PRIORITY_RANK: usize = 4;

/// Spread between the nearest battery and the `PRIORITY_RANK`-th nearest.
///
/// The rank is clamped to `battery_count - 1`, so with a single battery
/// every house scores 0. Returns 0 for an empty slice.
pub fn priority_spread(distances: &mut [u32]) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }
    distances.sort_unstable();
    let rank = PRIORITY_RANK.min(distances.len() - 1);
    f64::from(distances[rank] - distances[0])
}

/// Scores every house and stores the result in [`House::priority`](crate::model::House).
pub fn compute_priorities(grid: &mut Grid) {
    let scores: Vec<f64> = grid
        .houses()
        .iter()
        .map(|house| {
            let mut distances: Vec<u32> =
                grid.batteries().iter().map(|b| house.distance(b)).collect();
            priority_spread(&mut distances)
        })
        .collect();

    for (i, score) in scores.into_iter().enumerate() {
        grid.set_priority(HouseId(i), score);
    }
}

/// House ids sorted by priority, highest first. Ties keep input order.
pub fn placement_order(grid: &Grid) -> Vec<HouseId> {
    let mut order: Vec<HouseId> = grid.house_ids().collect();
    order.sort_by(|a, b| {
        grid.house(*b)
            .priority
            .total_cmp(&grid.house(*a).priority)
    });
    order
}
