//! District model: entities and the arena that owns them.
//!
//! Houses and batteries are created once from loader records. Their mutual
//! assignment changes constantly during optimization, always through
//! [`Grid::add_house`] and [`Grid::remove_house`], which keep the
//! house→battery and battery→houses sides of the index in lockstep.

mod grid;
mod types;

pub use grid::{Grid, ENERGY_EPSILON};
pub use types::{
    Battery, BatteryId, BatteryRecord, Cable, CableId, Entity, House, HouseId, HouseRecord, Point,
};
