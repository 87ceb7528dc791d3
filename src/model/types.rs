//! Entity types placed on the district grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rectilinear (L1) distance.
    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four grid neighbours in a fixed order: up, down, left, right.
    pub fn neighbors(self) -> [Point; 4] {
        [
            Point::new(self.x, self.y + 1),
            Point::new(self.x, self.y - 1),
            Point::new(self.x - 1, self.y),
            Point::new(self.x + 1, self.y),
        ]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Index of a house in [`Grid::houses`](super::Grid::houses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HouseId(pub usize);

/// Index of a battery in [`Grid::batteries`](super::Grid::batteries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatteryId(pub usize);

/// Index of a cable in [`Grid::cables`](super::Grid::cables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CableId(pub usize);

/// Input record for a house, as produced by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseRecord {
    pub x: i32,
    pub y: i32,
    pub energy: f64,
}

/// Input record for a battery, as produced by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryRecord {
    pub x: i32,
    pub y: i32,
    pub capacity: f64,
}

/// An energy-producing house.
///
/// The owning battery and the cable list are maintained by
/// [`Grid`](super::Grid); they are read-only from outside the crate.
#[derive(Debug, Clone)]
pub struct House {
    /// 1-based input row.
    pub id: u32,
    pub position: Point,
    /// Fixed demand placed on the owning battery.
    pub energy: f64,
    /// Placement urgency; higher is placed earlier.
    pub priority: f64,
    pub(crate) battery: Option<BatteryId>,
    pub(crate) cables: Vec<CableId>,
}

impl House {
    pub fn new(id: u32, position: Point, energy: f64) -> Self {
        Self {
            id,
            position,
            energy,
            priority: 0.0,
            battery: None,
            cables: Vec::new(),
        }
    }

    /// The owning battery, or `None` if the house is unplaced.
    pub fn battery(&self) -> Option<BatteryId> {
        self.battery
    }

    /// Cables attributed to this house, ordered from house to battery.
    pub fn cables(&self) -> &[CableId] {
        &self.cables
    }

    pub fn distance(&self, battery: &Battery) -> u32 {
        self.position.manhattan(battery.position)
    }

    /// Whether `battery` still has room for this house's demand.
    pub fn check_connection(&self, battery: &Battery) -> bool {
        battery.remaining - self.energy >= 0.0
    }
}

/// A capacity-limited battery together with its routing state.
#[derive(Debug, Clone)]
pub struct Battery {
    /// 1-based input row.
    pub id: u32,
    pub position: Point,
    pub capacity: f64,
    pub(crate) remaining: f64,
    pub(crate) houses: Vec<HouseId>,
    pub(crate) fragments: Vec<Vec<Point>>,
}

impl Battery {
    pub fn new(id: u32, position: Point, capacity: f64) -> Self {
        Self {
            id,
            position,
            capacity,
            remaining: capacity,
            houses: Vec::new(),
            fragments: vec![vec![position]],
        }
    }

    /// Capacity minus the demand of all connected houses.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Connected houses in insertion order; the tail holds the houses that
    /// were connected last and therefore have the lowest priority.
    pub fn houses(&self) -> &[HouseId] {
        &self.houses
    }

    /// Path fragments not yet merged into the routing tree.
    pub fn fragments(&self) -> &[Vec<Point>] {
        &self.fragments
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The single merged path, once routing has reduced the fragments to one.
    pub fn merged_path(&self) -> Option<&[Point]> {
        match self.fragments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Up to `window` lowest-priority houses, lowest first.
    pub fn low_priority(&self, window: usize) -> Vec<HouseId> {
        self.houses.iter().rev().take(window).copied().collect()
    }
}

/// One grid cell of laid cable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cable {
    pub id: CableId,
    pub position: Point,
    pub battery: BatteryId,
    /// Set when the cable belongs to one house only (direct routing).
    pub house: Option<HouseId>,
}

/// Anything that can occupy a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    House(HouseId),
    Battery(BatteryId),
    Cable(CableId),
}

impl Entity {
    pub fn is_cable(&self) -> bool {
        matches!(self, Entity::Cable(_))
    }
}
