//! Arena-indexed district state.
//!
//! All houses, batteries and cables live in flat vectors and refer to each
//! other by index. Cloning a [`Grid`] is therefore a plain structural copy,
//! which is what the annealer uses to snapshot and roll back a move.

use super::types::{
    Battery, BatteryId, BatteryRecord, Cable, CableId, Entity, House, HouseId, HouseRecord, Point,
};
use crate::error::{GridError, GridResult};
use crate::spatial::SpatialIndex;

/// Tolerance for floating-point energy bookkeeping.
pub const ENERGY_EPSILON: f64 = 1e-9;

/// One district: houses, batteries, laid cables and the spatial index.
#[derive(Debug, Clone)]
pub struct Grid {
    houses: Vec<House>,
    batteries: Vec<Battery>,
    cables: Vec<Cable>,
    index: SpatialIndex,
}

impl Grid {
    /// Builds a grid from loader records. Ids are assigned 1-based in
    /// record order.
    pub fn new(houses: &[HouseRecord], batteries: &[BatteryRecord]) -> Self {
        let houses: Vec<House> = houses
            .iter()
            .enumerate()
            .map(|(i, r)| House::new(i as u32 + 1, Point::new(r.x, r.y), r.energy))
            .collect();
        let batteries: Vec<Battery> = batteries
            .iter()
            .enumerate()
            .map(|(i, r)| Battery::new(i as u32 + 1, Point::new(r.x, r.y), r.capacity))
            .collect();

        let mut index = SpatialIndex::new();
        for (i, house) in houses.iter().enumerate() {
            index.place(Entity::House(HouseId(i)), house.position);
        }
        for (i, battery) in batteries.iter().enumerate() {
            index.place(Entity::Battery(BatteryId(i)), battery.position);
        }

        Self {
            houses,
            batteries,
            cables: Vec::new(),
            index,
        }
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn batteries(&self) -> &[Battery] {
        &self.batteries
    }

    pub fn cables(&self) -> &[Cable] {
        &self.cables
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn house(&self, id: HouseId) -> &House {
        &self.houses[id.0]
    }

    pub fn battery(&self, id: BatteryId) -> &Battery {
        &self.batteries[id.0]
    }

    pub fn cable(&self, id: CableId) -> &Cable {
        &self.cables[id.0]
    }

    pub fn house_ids(&self) -> impl Iterator<Item = HouseId> {
        (0..self.houses.len()).map(HouseId)
    }

    pub fn battery_ids(&self) -> impl Iterator<Item = BatteryId> {
        (0..self.batteries.len()).map(BatteryId)
    }

    pub(crate) fn set_priority(&mut self, house: HouseId, priority: f64) {
        self.houses[house.0].priority = priority;
    }

    pub(crate) fn battery_mut(&mut self, id: BatteryId) -> &mut Battery {
        &mut self.batteries[id.0]
    }

    /// Houses that currently have no battery, in index order.
    pub fn unplaced_houses(&self) -> Vec<HouseId> {
        self.house_ids()
            .filter(|&h| self.houses[h.0].battery.is_none())
            .collect()
    }

    /// Total cables laid across all batteries.
    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    /// Connects `house` to `battery`.
    ///
    /// Updates both sides of the ownership index, reduces the battery's
    /// remaining energy and appends the house's singleton path fragment.
    /// Fails without mutating anything if the house is already owned or the
    /// battery lacks capacity.
    pub fn add_house(&mut self, battery: BatteryId, house: HouseId) -> GridResult<()> {
        let h = &self.houses[house.0];
        if let Some(owner) = h.battery {
            return Err(GridError::InvariantViolation(format!(
                "house {} already connected to battery {}",
                h.id, self.batteries[owner.0].id
            )));
        }
        let b = &self.batteries[battery.0];
        if b.remaining - h.energy < -ENERGY_EPSILON {
            return Err(GridError::InvariantViolation(format!(
                "battery {} has {:.3} remaining, cannot take house {} ({:.3})",
                b.id, b.remaining, h.id, h.energy
            )));
        }

        let position = h.position;
        self.houses[house.0].battery = Some(battery);
        let b = &mut self.batteries[battery.0];
        b.houses.push(house);
        b.fragments.push(vec![position]);
        self.refresh_remaining(battery);
        Ok(())
    }

    /// Disconnects `house` from `battery`; the exact inverse of
    /// [`add_house`](Self::add_house).
    pub fn remove_house(&mut self, battery: BatteryId, house: HouseId) -> GridResult<()> {
        let b = &self.batteries[battery.0];
        let h = &self.houses[house.0];
        let slot = b.houses.iter().position(|&x| x == house).ok_or_else(|| {
            GridError::InvariantViolation(format!(
                "house {} is not connected to battery {}",
                h.id, b.id
            ))
        })?;
        let fragment = b
            .fragments
            .iter()
            .rposition(|f| f.len() == 1 && f[0] == h.position)
            .ok_or_else(|| {
                GridError::InvariantViolation(format!(
                    "battery {} has no open fragment for house {}",
                    b.id, h.id
                ))
            })?;

        let b = &mut self.batteries[battery.0];
        b.houses.remove(slot);
        b.fragments.remove(fragment);
        self.houses[house.0].battery = None;
        self.refresh_remaining(battery);
        Ok(())
    }

    /// Moves `house` from one battery to another.
    pub fn move_house(&mut self, from: BatteryId, to: BatteryId, house: HouseId) -> GridResult<()> {
        self.remove_house(from, house)?;
        self.add_house(to, house)
    }

    /// Recomputes remaining energy from the connected houses, so that
    /// add/remove pairs restore the counter exactly.
    fn refresh_remaining(&mut self, battery: BatteryId) {
        let used: f64 = self.batteries[battery.0]
            .houses
            .iter()
            .map(|h| self.houses[h.0].energy)
            .sum();
        let b = &mut self.batteries[battery.0];
        b.remaining = b.capacity - used;
    }

    /// Drops all cables and restores every battery's fragment collection to
    /// its own location plus one singleton per connected house.
    pub fn reset_routes(&mut self) {
        self.clear_cables();
        for b in &mut self.batteries {
            let mut fragments = Vec::with_capacity(b.houses.len() + 1);
            fragments.push(vec![b.position]);
            fragments.extend(b.houses.iter().map(|h| vec![self.houses[h.0].position]));
            b.fragments = fragments;
        }
    }

    /// Removes every cable from the grid, the index and the houses.
    pub fn clear_cables(&mut self) {
        self.cables.clear();
        self.index.remove_cables();
        for house in &mut self.houses {
            house.cables.clear();
        }
    }

    /// Creates a cable and registers it in the spatial index.
    pub(crate) fn push_cable(
        &mut self,
        battery: BatteryId,
        position: Point,
        house: Option<HouseId>,
    ) -> CableId {
        let id = CableId(self.cables.len());
        self.cables.push(Cable {
            id,
            position,
            battery,
            house,
        });
        self.index.place(Entity::Cable(id), position);
        if let Some(h) = house {
            self.houses[h.0].cables.push(id);
        }
        id
    }

    pub(crate) fn set_house_cables(&mut self, house: HouseId, cables: Vec<CableId>) {
        self.houses[house.0].cables = cables;
    }

    /// Every entity on the grid, for rendering.
    pub fn entities(&self) -> impl Iterator<Item = (Entity, Point)> + '_ {
        let houses = self
            .houses
            .iter()
            .enumerate()
            .map(|(i, h)| (Entity::House(HouseId(i)), h.position));
        let batteries = self
            .batteries
            .iter()
            .enumerate()
            .map(|(i, b)| (Entity::Battery(BatteryId(i)), b.position));
        let cables = self
            .cables
            .iter()
            .map(|c| (Entity::Cable(c.id), c.position));
        houses.chain(batteries).chain(cables)
    }

    /// Verifies capacity, exclusive ownership and, for batteries whose
    /// fragments are fully merged, path coverage.
    pub fn check_invariants(&self) -> GridResult<()> {
        let mut owners = vec![None; self.houses.len()];

        for (bi, b) in self.batteries.iter().enumerate() {
            let used: f64 = b.houses.iter().map(|h| self.houses[h.0].energy).sum();
            if (b.capacity - used - b.remaining).abs() > ENERGY_EPSILON {
                return Err(GridError::InvariantViolation(format!(
                    "battery {} remaining {:.6} != capacity {:.6} - used {:.6}",
                    b.id, b.remaining, b.capacity, used
                )));
            }
            if b.remaining < -ENERGY_EPSILON {
                return Err(GridError::InvariantViolation(format!(
                    "battery {} overloaded by {:.6}",
                    b.id, -b.remaining
                )));
            }

            for &h in &b.houses {
                if let Some(other) = owners[h.0].replace(bi) {
                    return Err(GridError::InvariantViolation(format!(
                        "house {} claimed by batteries {} and {}",
                        self.houses[h.0].id, self.batteries[other].id, b.id
                    )));
                }
                if self.houses[h.0].battery != Some(BatteryId(bi)) {
                    return Err(GridError::InvariantViolation(format!(
                        "house {} does not point back at battery {}",
                        self.houses[h.0].id, b.id
                    )));
                }
            }

            if let Some(path) = b.merged_path() {
                let covered = |p: Point| path.contains(&p);
                if !covered(b.position) {
                    return Err(GridError::InvariantViolation(format!(
                        "merged path of battery {} misses the battery",
                        b.id
                    )));
                }
                if let Some(&h) = b
                    .houses
                    .iter()
                    .find(|h| !covered(self.houses[h.0].position))
                {
                    return Err(GridError::InvariantViolation(format!(
                        "merged path of battery {} misses house {}",
                        b.id, self.houses[h.0].id
                    )));
                }
            }
        }

        for (hi, house) in self.houses.iter().enumerate() {
            if house.battery.is_some() && owners[hi].is_none() {
                return Err(GridError::InvariantViolation(format!(
                    "house {} points at a battery that does not list it",
                    house.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        Grid::new(
            &[
                HouseRecord { x: 1, y: 1, energy: 40.0 },
                HouseRecord { x: 2, y: 5, energy: 70.0 },
            ],
            &[BatteryRecord { x: 0, y: 0, capacity: 100.0 }],
        )
    }

    #[test]
    fn test_ids_are_one_based() {
        let grid = small_grid();
        assert_eq!(grid.house(HouseId(0)).id, 1);
        assert_eq!(grid.battery(BatteryId(0)).id, 1);
        assert_eq!(grid.index().occupied_cells(), 3);
    }

    #[test]
    fn test_add_house_updates_both_sides() {
        let mut grid = small_grid();
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        let b = grid.battery(BatteryId(0));
        assert!((b.remaining() - 60.0).abs() < 1e-12);
        assert_eq!(b.houses(), &[HouseId(0)]);
        assert_eq!(b.fragment_count(), 2);
        assert_eq!(grid.house(HouseId(0)).battery(), Some(BatteryId(0)));
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_add_house_rejects_overload() {
        let mut grid = small_grid();
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        let err = grid.add_house(BatteryId(0), HouseId(1)).unwrap_err();
        assert!(matches!(err, GridError::InvariantViolation(_)));
        // Rejected call leaves the grid untouched.
        assert_eq!(grid.battery(BatteryId(0)).houses(), &[HouseId(0)]);
        assert_eq!(grid.house(HouseId(1)).battery(), None);
    }

    #[test]
    fn test_add_house_rejects_double_owner() {
        let mut grid = Grid::new(
            &[HouseRecord { x: 1, y: 1, energy: 10.0 }],
            &[
                BatteryRecord { x: 0, y: 0, capacity: 100.0 },
                BatteryRecord { x: 5, y: 5, capacity: 100.0 },
            ],
        );
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        assert!(grid.add_house(BatteryId(1), HouseId(0)).is_err());
    }

    #[test]
    fn test_add_remove_round_trip_is_exact() {
        let mut grid = small_grid();
        grid.add_house(BatteryId(0), HouseId(1)).unwrap();
        let before = grid.battery(BatteryId(0)).clone();
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        grid.remove_house(BatteryId(0), HouseId(0)).unwrap();
        let after = grid.battery(BatteryId(0));
        assert_eq!(before.remaining().to_bits(), after.remaining().to_bits());
        assert_eq!(before.houses(), after.houses());
        assert_eq!(before.fragments(), after.fragments());
        assert_eq!(grid.house(HouseId(0)).battery(), None);
    }

    #[test]
    fn test_remove_non_member_fails() {
        let mut grid = small_grid();
        assert!(grid.remove_house(BatteryId(0), HouseId(0)).is_err());
    }

    #[test]
    fn test_reset_routes_rebuilds_singletons() {
        let mut grid = small_grid();
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        grid.battery_mut(BatteryId(0)).fragments = vec![vec![Point::new(0, 0), Point::new(1, 0)]];
        grid.push_cable(BatteryId(0), Point::new(1, 0), None);
        grid.reset_routes();
        assert_eq!(grid.cable_count(), 0);
        assert_eq!(
            grid.battery(BatteryId(0)).fragments(),
            &[vec![Point::new(0, 0)], vec![Point::new(1, 1)]]
        );
    }

    #[test]
    fn test_invariants_catch_missing_coverage() {
        let mut grid = small_grid();
        grid.add_house(BatteryId(0), HouseId(0)).unwrap();
        grid.battery_mut(BatteryId(0)).fragments = vec![vec![Point::new(0, 0)]];
        assert!(grid.check_invariants().is_err());
    }

    #[test]
    fn test_entities_lists_every_kind() {
        let mut grid = small_grid();
        grid.push_cable(BatteryId(0), Point::new(0, 1), Some(HouseId(0)));
        let kinds: Vec<Entity> = grid.entities().map(|(e, _)| e).collect();
        assert_eq!(kinds.len(), 4);
        assert!(kinds.contains(&Entity::Cable(CableId(0))));
        assert_eq!(grid.house(HouseId(0)).cables(), &[CableId(0)]);
    }
}
