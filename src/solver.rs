//! End-to-end optimization of one district.
//!
//! Assignment → rebalancing → initial routing → annealing → cable
//! attribution, with an invariant check after every stage.

use crate::anneal::{AnnealConfig, Annealer, LayoutCost, RoutedCost};
use crate::assign::Assigner;
use crate::cost::{Cost, CostModel};
use crate::error::{GridError, GridResult};
use crate::io::{district_paths, load_batteries, load_houses, Report};
use crate::model::{BatteryRecord, Entity, Grid, HouseId, HouseRecord, Point};
use crate::rebalance::{RebalanceConfig, Rebalancer};
use crate::route::{Router, RoutingStrategy};
use std::path::Path;
use tracing::{info, info_span, warn};

/// Settings for every stage of a run.
///
/// # Examples
///
/// ```
/// use u_smartgrid::solver::SolverConfig;
/// use u_smartgrid::anneal::AnnealConfig;
/// use u_smartgrid::route::RoutingStrategy;
///
/// let config = SolverConfig::default()
///     .with_anneal(AnnealConfig::default().with_iterations(100).with_seed(1))
///     .with_routing(RoutingStrategy::Shared);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub anneal: AnnealConfig,
    pub rebalance: RebalanceConfig,
    pub cost: CostModel,
    pub routing: RoutingStrategy,
}

impl SolverConfig {
    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    pub fn with_rebalance(mut self, rebalance: RebalanceConfig) -> Self {
        self.rebalance = rebalance;
        self
    }

    pub fn with_cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_routing(mut self, routing: RoutingStrategy) -> Self {
        self.routing = routing;
        self
    }

    pub fn validate(&self) -> GridResult<()> {
        self.anneal.validate()?;
        self.rebalance.validate()?;
        self.cost.validate()
    }
}

/// Counters collected while optimizing.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Houses the greedy pass could not place.
    pub greedy_unplaced: usize,
    pub rebalance_moves: usize,
    pub rebalance_swaps: usize,
    /// Cost right after rebalancing and the first routing.
    pub initial_cost: Cost,
    pub anneal_iterations: usize,
    pub accepted_moves: usize,
    pub improving_moves: usize,
    /// Best cost sampled during annealing.
    pub cost_history: Vec<Cost>,
}

/// A district ready to be optimized.
#[derive(Debug, Clone)]
pub struct SmartGrid {
    district: u32,
    grid: Grid,
    config: SolverConfig,
}

impl SmartGrid {
    pub fn new(
        district: u32,
        houses: &[HouseRecord],
        batteries: &[BatteryRecord],
        config: SolverConfig,
    ) -> GridResult<Self> {
        config.validate()?;
        Ok(Self {
            district,
            grid: Grid::new(houses, batteries),
            config,
        })
    }

    /// Loads `district_<n>/district-<n>_{houses,batteries}.csv` under `root`.
    pub fn from_dir(root: &Path, district: u32, config: SolverConfig) -> GridResult<Self> {
        let (houses, batteries) = district_paths(root, district);
        let houses = load_houses(&houses)?;
        let batteries = load_batteries(&batteries)?;
        Self::new(district, &houses, &batteries, config)
    }

    pub fn district(&self) -> u32 {
        self.district
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Runs every stage and returns the best layout found.
    ///
    /// Unplaceable houses do not fail the run; the returned layout reports
    /// [`Cost::Infeasible`] and [`Layout::ensure_feasible`] surfaces them.
    pub fn optimize(self) -> GridResult<Layout> {
        let span = info_span!("district", n = self.district);
        let _enter = span.enter();

        let SmartGrid {
            district,
            mut grid,
            config,
        } = self;

        let assigned = Assigner::run(&mut grid)?;
        grid.check_invariants()?;

        let rebalanced = Rebalancer::run(&mut grid, &assigned.unplaced, &config.rebalance)?;
        grid.check_invariants()?;
        if !rebalanced.is_complete() {
            warn!(
                unplaced = rebalanced.unplaced.len(),
                "district is capacity infeasible"
            );
        }

        let objective = RoutedCost::new(config.routing, config.cost);
        let mut initial = grid.clone();
        let initial_cost = objective.evaluate(&mut initial)?;
        initial.check_invariants()?;

        let annealed = Annealer::run(grid, &objective, &config.anneal)?;

        let mut best = annealed.best;
        Router::attribute_cables(&mut best, config.routing)?;
        best.check_invariants()?;

        info!(%initial_cost, best_cost = %annealed.best_cost, "district optimized");

        let unplaced = best.unplaced_houses();
        Ok(Layout {
            district,
            cost: annealed.best_cost,
            routing: config.routing,
            unplaced,
            stats: RunStats {
                greedy_unplaced: assigned.unplaced.len(),
                rebalance_moves: rebalanced.moves,
                rebalance_swaps: rebalanced.swaps,
                initial_cost,
                anneal_iterations: annealed.iterations,
                accepted_moves: annealed.accepted_moves,
                improving_moves: annealed.improving_moves,
                cost_history: annealed.cost_history,
            },
            grid: best,
        })
    }
}

/// The optimized layout of one district.
#[derive(Debug, Clone)]
pub struct Layout {
    district: u32,
    grid: Grid,
    cost: Cost,
    routing: RoutingStrategy,
    unplaced: Vec<HouseId>,
    stats: RunStats,
}

impl Layout {
    pub fn district(&self) -> u32 {
        self.district
    }

    /// Routed grid of the best assignment.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// `cable_cost × cables + battery_cost × batteries`, or
    /// [`Cost::Infeasible`] if any house is unplaced.
    pub fn total_cost(&self) -> Cost {
        self.cost
    }

    pub fn cable_count(&self) -> usize {
        self.grid.cable_count()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn unplaced(&self) -> &[HouseId] {
        &self.unplaced
    }

    /// Fails with [`GridError::CapacityInfeasible`] if any house is unplaced.
    pub fn ensure_feasible(&self) -> GridResult<()> {
        if self.unplaced.is_empty() {
            return Ok(());
        }
        Err(GridError::CapacityInfeasible {
            unplaced: self
                .unplaced
                .iter()
                .map(|&h| self.grid.house(h).id)
                .collect(),
        })
    }

    pub fn report(&self) -> Report {
        Report::build(self.district, &self.grid, self.cost, self.routing)
    }

    /// Every house, battery and cable with its position, for rendering.
    pub fn entities(&self) -> impl Iterator<Item = (Entity, Point)> + '_ {
        self.grid.entities()
    }
}

/// Optimizes several independent districts.
///
/// With the `parallel` feature each district runs on its own rayon worker;
/// every run stays single-threaded internally.
pub fn solve_districts(districts: Vec<SmartGrid>) -> Vec<GridResult<Layout>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        districts.into_par_iter().map(SmartGrid::optimize).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        districts.into_iter().map(SmartGrid::optimize).collect()
    }
}
