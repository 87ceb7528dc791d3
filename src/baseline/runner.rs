//! Random layout sampling.

use super::config::BaselineConfig;
use crate::cost::{Cost, CostModel};
use crate::error::{GridError, GridResult};
use crate::model::{BatteryId, Entity, Grid, HouseId, Point};
use crate::route::{segment, unique_in_order};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Failure count and cost spread over many random layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub runs: usize,

    /// Runs where some house found no battery with room.
    pub failures: usize,

    /// Costs of the successful runs, in run order.
    pub costs: Vec<i64>,
}

impl BaselineSummary {
    /// Share of failed runs, in percent.
    pub fn failure_percentage(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.failures as f64 / self.runs as f64 * 100.0
        }
    }

    pub fn mean_cost(&self) -> Option<f64> {
        if self.costs.is_empty() {
            return None;
        }
        Some(self.costs.iter().sum::<i64>() as f64 / self.costs.len() as f64)
    }

    pub fn min_cost(&self) -> Option<i64> {
        self.costs.iter().copied().min()
    }

    pub fn max_cost(&self) -> Option<i64> {
        self.costs.iter().copied().max()
    }
}

/// Builds random layouts.
pub struct RandomBaseline;

impl RandomBaseline {
    /// Samples `config.runs` layouts, each on a fresh copy of `grid`.
    pub fn sample(grid: &Grid, config: &BaselineConfig) -> GridResult<BaselineSummary> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::sample_with_rng(grid, config, &mut rng)
    }

    /// Like [`sample`](Self::sample), drawing all randomness from `rng`.
    pub fn sample_with_rng<R: Rng>(
        grid: &Grid,
        config: &BaselineConfig,
        rng: &mut R,
    ) -> GridResult<BaselineSummary> {
        config.validate()?;

        let mut summary = BaselineSummary {
            runs: config.runs,
            ..BaselineSummary::default()
        };
        for _ in 0..config.runs {
            let mut layout = grid.clone();
            match Self::run_once(&mut layout, &config.cost, rng)? {
                Cost::Feasible(cost) => summary.costs.push(cost),
                Cost::Infeasible => summary.failures += 1,
            }
        }

        info!(
            runs = summary.runs,
            failures = summary.failures,
            failure_pct = summary.failure_percentage(),
            mean_cost = ?summary.mean_cost(),
            "baseline sampled"
        );
        Ok(summary)
    }

    /// Assigns and cables every house at random.
    ///
    /// `grid` must have no house connected yet. Returns
    /// [`Cost::Infeasible`] as soon as a house fits on no battery; the grid
    /// then holds the partial layout.
    pub fn run_once<R: Rng>(grid: &mut Grid, model: &CostModel, rng: &mut R) -> GridResult<Cost> {
        if let Some(h) = grid.house_ids().find(|&h| grid.house(h).battery().is_some()) {
            return Err(GridError::InvariantViolation(format!(
                "random layout needs an unassigned grid, house {} is connected",
                grid.house(h).id
            )));
        }
        grid.clear_cables();

        let n = grid.batteries().len();
        let mut order: Vec<HouseId> = grid.house_ids().collect();
        order.shuffle(rng);

        for house in order {
            let Some(battery) = Self::pick_battery(grid, house, rng) else {
                debug!(house = grid.house(house).id, "no battery has room");
                return Ok(Cost::Infeasible);
            };
            grid.add_house(battery, house)?;
            Self::lay_until_shared(grid, house, battery);
        }
        Ok(model.total(grid.cable_count(), n))
    }

    /// A uniformly drawn battery, or the next one with room in cyclic order.
    fn pick_battery<R: Rng>(grid: &Grid, house: HouseId, rng: &mut R) -> Option<BatteryId> {
        let n = grid.batteries().len();
        if n == 0 {
            return None;
        }
        let start = rng.random_range(0..n);
        (0..n)
            .map(|k| BatteryId((start + k) % n))
            .find(|&b| grid.house(house).check_connection(grid.battery(b)))
    }

    /// Lays the corner route from `house` towards `battery`, stopping before
    /// the first cell past the house that already carries a cable to the
    /// same battery. Returns the number of cables laid.
    fn lay_until_shared(grid: &mut Grid, house: HouseId, battery: BatteryId) -> usize {
        let route = corner_route(grid.house(house).position, grid.battery(battery).position);
        let mut laid = 0;
        for (i, point) in route.into_iter().enumerate() {
            let joins = grid.index().contents_at(point).iter().any(|e| match e {
                Entity::Cable(c) => grid.cable(*c).battery == battery,
                _ => false,
            });
            if i > 0 && joins {
                break;
            }
            grid.push_cable(battery, point, Some(house));
            laid += 1;
        }
        laid
    }
}

/// Horizontal along the house's row, then vertical along the battery's
/// column; ordered from house to battery.
pub fn corner_route(house: Point, battery: Point) -> Vec<Point> {
    let corner = Point::new(battery.x, house.y);
    unique_in_order(
        segment(house, corner)
            .into_iter()
            .chain(segment(corner, battery)),
    )
}
