//! Objective trait for the annealer.

use crate::cost::{Cost, CostModel};
use crate::error::GridResult;
use crate::model::Grid;
use crate::route::{Router, RoutingStrategy};

/// Prices an assignment.
///
/// `evaluate` receives a scratch copy of the working grid and may route it
/// in place; the annealer keeps that copy when it becomes the new best.
pub trait LayoutCost {
    fn evaluate(&self, grid: &mut Grid) -> GridResult<Cost>;
}

/// Routes the grid with a fixed strategy and prices the cables laid.
///
/// Grids with unplaced houses are routed as far as possible but priced as
/// [`Cost::Infeasible`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutedCost {
    pub strategy: RoutingStrategy,
    pub model: CostModel,
}

impl RoutedCost {
    pub fn new(strategy: RoutingStrategy, model: CostModel) -> Self {
        Self { strategy, model }
    }
}

impl LayoutCost for RoutedCost {
    fn evaluate(&self, grid: &mut Grid) -> GridResult<Cost> {
        let cables = Router::route_all(grid, self.strategy)?;
        if !grid.unplaced_houses().is_empty() {
            return Ok(Cost::Infeasible);
        }
        Ok(self.model.total(cables, grid.batteries().len()))
    }
}
