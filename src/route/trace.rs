//! Attributes shared cables to individual houses.
//!
//! A battery's merged path is 4-connected, so every connected house can
//! reach the battery by stepping between neighbouring cable cells. The
//! breadth-first walk below finds the shortest such walk and records its
//! cables on the house, ordered from house to battery.

use crate::error::{GridError, GridResult};
use crate::model::{CableId, Grid, HouseId, Point};
use std::collections::{HashMap, VecDeque};

/// Fills [`House::cables`](crate::model::House::cables) for every connected
/// house from the shared cables of its battery.
pub fn trace_house_cables(grid: &mut Grid) -> GridResult<()> {
    let mut traced: Vec<(HouseId, Vec<CableId>)> = Vec::new();

    for battery in grid.battery_ids() {
        let cells: HashMap<Point, CableId> = grid
            .cables()
            .iter()
            .filter(|c| c.battery == battery)
            .map(|c| (c.position, c.id))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let target = grid.battery(battery).position;
        for &house in grid.battery(battery).houses() {
            let start = grid.house(house).position;
            let walk = shortest_walk(&cells, start, target).ok_or_else(|| {
                GridError::InvariantViolation(format!(
                    "house {} is not connected to battery {} by cable",
                    grid.house(house).id,
                    grid.battery(battery).id
                ))
            })?;
            traced.push((house, walk.iter().map(|p| cells[p]).collect()));
        }
    }

    for (house, cables) in traced {
        grid.set_house_cables(house, cables);
    }
    Ok(())
}

/// Shortest 4-connected walk from `start` to `target` over `cells`.
fn shortest_walk(
    cells: &HashMap<Point, CableId>,
    start: Point,
    target: Point,
) -> Option<Vec<Point>> {
    if !cells.contains_key(&start) || !cells.contains_key(&target) {
        return None;
    }
    let mut previous: HashMap<Point, Point> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    previous.insert(start, start);

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut walk = vec![current];
            let mut at = current;
            while at != start {
                at = previous[&at];
                walk.push(at);
            }
            walk.reverse();
            return Some(walk);
        }
        for next in current.neighbors() {
            if cells.contains_key(&next) && !previous.contains_key(&next) {
                previous.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn cells(points: &[Point]) -> HashMap<Point, CableId> {
        points
            .iter()
            .enumerate()
            .map(|(i, &q)| (q, CableId(i)))
            .collect()
    }

    #[test]
    fn test_walk_along_l() {
        let map = cells(&[p(0, 0), p(0, 1), p(0, 2), p(1, 2), p(2, 2)]);
        let walk = shortest_walk(&map, p(2, 2), p(0, 0)).unwrap();
        assert_eq!(walk, vec![p(2, 2), p(1, 2), p(0, 2), p(0, 1), p(0, 0)]);
    }

    #[test]
    fn test_walk_disconnected() {
        let map = cells(&[p(0, 0), p(5, 5)]);
        assert!(shortest_walk(&map, p(0, 0), p(5, 5)).is_none());
    }

    #[test]
    fn test_walk_same_cell() {
        let map = cells(&[p(3, 3)]);
        assert_eq!(shortest_walk(&map, p(3, 3), p(3, 3)), Some(vec![p(3, 3)]));
    }
}
