//! Sparse spatial index over grid cells.
//!
//! Maps each occupied [`Point`] to the entities placed there. Houses and
//! batteries are placed once when the grid is built; cables are placed by
//! the router and cleared before every re-route.

use crate::model::{Entity, Point};
use std::collections::HashMap;

/// Multi-occupancy grid: any number of entities may share a cell.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    cells: HashMap<Point, Vec<Entity>>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `entity` at `point`.
    pub fn place(&mut self, entity: Entity, point: Point) {
        self.cells.entry(point).or_default().push(entity);
    }

    /// Entities at `point`, in placement order.
    pub fn contents_at(&self, point: Point) -> &[Entity] {
        self.cells.get(&point).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any entity on `points` satisfies `pred`.
    pub fn any_at<I, F>(&self, points: I, mut pred: F) -> bool
    where
        I: IntoIterator<Item = Point>,
        F: FnMut(&Entity) -> bool,
    {
        points
            .into_iter()
            .any(|p| self.contents_at(p).iter().any(&mut pred))
    }

    /// Removes every cable, leaving houses and batteries in place.
    pub fn remove_cables(&mut self) {
        self.cells.retain(|_, entities| {
            entities.retain(|e| !e.is_cable());
            !entities.is_empty()
        });
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Largest x and y over all occupied cells, or `None` when empty.
    pub fn bounds(&self) -> Option<(i32, i32)> {
        let max_x = self.cells.keys().map(|p| p.x).max()?;
        let max_y = self.cells.keys().map(|p| p.y).max()?;
        Some((max_x, max_y))
    }
}
