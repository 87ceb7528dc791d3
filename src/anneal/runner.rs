//! Annealing loop.
//!
//! # Algorithm
//!
//! 1. Price the starting assignment; it is the first best.
//! 2. Per iteration:
//!    a. Pick two distinct batteries and one house on each.
//!    b. Skip if swapping the houses would overload either battery.
//!    c. Snapshot the working grid, swap, and price a routed copy.
//!    d. Cool the acceptance probability.
//!    e. Record a new best if the cost beats every cost seen so far.
//!    f. Keep the swap if it improves on the working cost or a uniform draw
//!       falls under the acceptance probability; otherwise restore the
//!       snapshot.
//! 3. Return the best routed grid.

use super::config::AnnealConfig;
use super::types::LayoutCost;
use crate::cost::Cost;
use crate::error::GridResult;
use crate::model::{BatteryId, Grid, HouseId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    /// The best grid found, routed.
    pub best: Grid,

    /// Cost of the best grid.
    pub best_cost: Cost,

    /// Iterations run, skipped ones included.
    pub iterations: usize,

    /// Iterations skipped by the capacity pre-check or for lack of houses.
    pub skipped: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of moves that improved on the working cost.
    pub improving_moves: usize,

    /// Acceptance probability after the last cooling step.
    pub final_probability: f64,

    /// Best cost sampled at regular intervals; never increases.
    pub cost_history: Vec<Cost>,
}

/// A proposed exchange of two houses between two batteries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub first: (BatteryId, HouseId),
    pub second: (BatteryId, HouseId),
}

impl Swap {
    /// Whether both batteries stay within capacity after the exchange.
    pub fn is_feasible(&self, grid: &Grid) -> bool {
        let (b1, h1) = self.first;
        let (b2, h2) = self.second;
        let e1 = grid.house(h1).energy;
        let e2 = grid.house(h2).energy;
        !(e1 - e2 > grid.battery(b2).remaining() || e2 - e1 > grid.battery(b1).remaining())
    }

    /// Exchanges the two houses.
    pub fn apply(&self, grid: &mut Grid) -> GridResult<()> {
        let (b1, h1) = self.first;
        let (b2, h2) = self.second;
        grid.remove_house(b1, h1)?;
        grid.remove_house(b2, h2)?;
        grid.add_house(b1, h2)?;
        grid.add_house(b2, h1)
    }
}

/// Executes the annealing search.
pub struct Annealer;

impl Annealer {
    /// Runs the search with a generator seeded from `config.seed`.
    pub fn run<C: LayoutCost>(
        grid: Grid,
        objective: &C,
        config: &AnnealConfig,
    ) -> GridResult<AnnealResult> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::run_with_rng(grid, objective, config, &mut rng)
    }

    /// Runs the search drawing all randomness from `rng`.
    ///
    /// `current` may already be routed; its cables are discarded and the
    /// search works on the bare assignment.
    pub fn run_with_rng<C: LayoutCost, R: Rng>(
        mut current: Grid,
        objective: &C,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> GridResult<AnnealResult> {
        config.validate()?;
        // Swaps need every house's singleton fragment; drop any earlier routing.
        current.reset_routes();

        let mut best = current.clone();
        let mut best_cost = objective.evaluate(&mut best)?;
        let mut current_cost = best_cost;

        let mut probability = config.initial_probability;
        let mut step = 0usize;
        let mut iterations = 0usize;
        let mut skipped = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;

        let history_interval = (config.iterations / 100).max(1);
        let mut cost_history = vec![best_cost];

        // An infeasible start cannot be improved by swaps, which never
        // change how many houses are placed.
        let budget = if best_cost.is_feasible() {
            config.iterations
        } else {
            0
        };

        for _ in 0..budget {
            iterations += 1;

            match Self::propose(&current, rng) {
                Some(swap) if swap.is_feasible(&current) => {
                    let snapshot = current.clone();
                    swap.apply(&mut current)?;

                    let mut routed = current.clone();
                    let new_cost = objective.evaluate(&mut routed)?;

                    probability = config.cool(probability, step);
                    step += 1;

                    if new_cost.is_feasible() && new_cost < best_cost {
                        debug!(%new_cost, %best_cost, iteration = iterations, "new best");
                        best = routed;
                        best_cost = new_cost;
                    }

                    let improving = new_cost < current_cost;
                    let accept = new_cost.is_feasible()
                        && (improving || rng.random_range(0.0..1.0) <= probability);
                    if accept {
                        if improving {
                            improving_moves += 1;
                        }
                        accepted_moves += 1;
                        current_cost = new_cost;
                    } else {
                        current = snapshot;
                    }
                }
                _ => skipped += 1,
            }

            if iterations.is_multiple_of(history_interval) {
                cost_history.push(best_cost);
            }
        }

        if cost_history.last() != Some(&best_cost) {
            cost_history.push(best_cost);
        }

        info!(
            %best_cost,
            iterations,
            skipped,
            accepted_moves,
            improving_moves,
            "annealing done"
        );

        Ok(AnnealResult {
            best,
            best_cost,
            iterations,
            skipped,
            accepted_moves,
            improving_moves,
            final_probability: probability,
            cost_history,
        })
    }

    /// Picks two distinct batteries uniformly and one house on each.
    ///
    /// Returns `None` with fewer than two batteries or when a picked
    /// battery has no houses.
    pub fn propose<R: Rng>(grid: &Grid, rng: &mut R) -> Option<Swap> {
        let n = grid.batteries().len();
        if n < 2 {
            return None;
        }
        let b1 = rng.random_range(0..n);
        let mut b2 = rng.random_range(0..n - 1);
        if b2 >= b1 {
            b2 += 1;
        }

        let pick = |rng: &mut R, b: usize| -> Option<HouseId> {
            let houses = grid.battery(BatteryId(b)).houses();
            if houses.is_empty() {
                None
            } else {
                Some(houses[rng.random_range(0..houses.len())])
            }
        };
        let h1 = pick(&mut *rng, b1)?;
        let h2 = pick(&mut *rng, b2)?;
        Some(Swap {
            first: (BatteryId(b1), h1),
            second: (BatteryId(b2), h2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::{CoolingSchedule, RoutedCost};
    use crate::assign::Assigner;
    use crate::model::{BatteryRecord, HouseRecord};
    use crate::route::{Router, RoutingStrategy};

    fn assigned_grid() -> Grid {
        // Two clusters, each deliberately seeded onto the far battery so
        // swaps have something to fix.
        let houses = [
            HouseRecord { x: 1, y: 1, energy: 10.0 },
            HouseRecord { x: 2, y: 1, energy: 10.0 },
            HouseRecord { x: 1, y: 2, energy: 10.0 },
            HouseRecord { x: 18, y: 18, energy: 10.0 },
            HouseRecord { x: 19, y: 18, energy: 10.0 },
            HouseRecord { x: 18, y: 19, energy: 10.0 },
        ];
        let batteries = [
            BatteryRecord { x: 0, y: 0, capacity: 30.0 },
            BatteryRecord { x: 20, y: 20, capacity: 30.0 },
        ];
        let mut grid = Grid::new(&houses, &batteries);
        for (h, b) in [(0, 1), (1, 0), (2, 0), (3, 0), (4, 1), (5, 1)] {
            grid.add_house(BatteryId(b), HouseId(h)).unwrap();
        }
        grid
    }

    #[test]
    fn test_swap_apply_is_reversible() {
        let mut grid = assigned_grid();
        let before = grid.clone();
        let swap = Swap {
            first: (BatteryId(0), HouseId(1)),
            second: (BatteryId(1), HouseId(4)),
        };
        assert!(swap.is_feasible(&grid));
        swap.apply(&mut grid).unwrap();
        grid.check_invariants().unwrap();
        let back = Swap {
            first: (BatteryId(0), HouseId(4)),
            second: (BatteryId(1), HouseId(1)),
        };
        back.apply(&mut grid).unwrap();
        for b in grid.battery_ids() {
            let mut now = grid.battery(b).houses().to_vec();
            let mut was = before.battery(b).houses().to_vec();
            now.sort();
            was.sort();
            assert_eq!(now, was);
        }
    }

    #[test]
    fn test_infeasible_swap_detected() {
        let mut grid = Grid::new(
            &[
                HouseRecord { x: 1, y: 0, energy: 2500.0 },
                HouseRecord { x: 9, y: 0, energy: 1000.0 },
            ],
            &[
                BatteryRecord { x: 0, y: 0, capacity: 3000.0 },
                BatteryRecord { x: 10, y: 0, capacity: 1500.0 },
            ],
        );
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        grid.add_house(BatteryId(1), HouseId(1)).unwrap();
        let swap = Swap {
            first: (BatteryId(0), HouseId(0)),
            second: (BatteryId(1), HouseId(1)),
        };
        assert!(!swap.is_feasible(&grid));
    }

    #[test]
    fn test_anneal_improves_bad_start() {
        let grid = assigned_grid();
        let objective = RoutedCost::default();
        let mut start = grid.clone();
        let start_cost = objective.evaluate(&mut start).unwrap();

        let config = AnnealConfig::default().with_iterations(300).with_seed(42);
        let result = Annealer::run(grid, &objective, &config).unwrap();

        assert!(
            result.best_cost < start_cost,
            "expected improvement from {start_cost}, got {}",
            result.best_cost
        );
        assert_eq!(result.iterations, 300);
        result.best.check_invariants().unwrap();
    }

    #[test]
    fn test_cost_history_non_increasing() {
        let config = AnnealConfig::default()
            .with_iterations(200)
            .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
            .with_seed(7);
        let result = Annealer::run(assigned_grid(), &RoutedCost::default(), &config).unwrap();
        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best cost history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.cost_history.last(), Some(&result.best_cost));
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = AnnealConfig::default().with_iterations(100).with_seed(3);
        let a = Annealer::run(assigned_grid(), &RoutedCost::default(), &config).unwrap();
        let b = Annealer::run(assigned_grid(), &RoutedCost::default(), &config).unwrap();
        assert_eq!(a.best_cost, b.best_cost);
        assert_eq!(a.accepted_moves, b.accepted_moves);
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_single_battery_skips_everything() {
        let mut grid = Grid::new(
            &[HouseRecord { x: 1, y: 0, energy: 1.0 }],
            &[BatteryRecord { x: 0, y: 0, capacity: 10.0 }],
        );
        Assigner::run(&mut grid).unwrap();
        let config = AnnealConfig::default().with_iterations(20).with_seed(1);
        let result = Annealer::run(grid, &RoutedCost::default(), &config).unwrap();
        assert_eq!(result.skipped, 20);
        assert_eq!(result.accepted_moves, 0);
        assert!((result.final_probability - 1.0).abs() < 1e-12);
        assert_eq!(result.best_cost, Cost::Feasible(9 * 2 + 5000));
    }

    #[test]
    fn test_anneal_accepts_routed_grid() {
        let mut grid = assigned_grid();
        Router::route_all(&mut grid, RoutingStrategy::Shared).unwrap();
        assert!(grid.cable_count() > 0);

        let config = AnnealConfig::default().with_iterations(100).with_seed(5);
        let result = Annealer::run(grid, &RoutedCost::default(), &config).unwrap();
        assert!(result.best_cost.is_feasible());
        assert!(result.skipped < result.iterations);
        result.best.check_invariants().unwrap();
    }

    #[test]
    fn test_infeasible_start_is_not_searched() {
        let mut grid = Grid::new(
            &[HouseRecord { x: 1, y: 0, energy: 100.0 }],
            &[
                BatteryRecord { x: 0, y: 0, capacity: 10.0 },
                BatteryRecord { x: 5, y: 0, capacity: 10.0 },
            ],
        );
        Assigner::run(&mut grid).unwrap();
        let config = AnnealConfig::default().with_iterations(50).with_seed(1);
        let result = Annealer::run(grid, &RoutedCost::default(), &config).unwrap();
        assert_eq!(result.best_cost, Cost::Infeasible);
        assert_eq!(result.iterations, 0);
    }
}
