//! Per-house routing without shared cables.
//!
//! Every house gets its own L-shaped cable to its battery. The route leaves
//! the lower of the two endpoints vertically, crosses horizontally and then
//! runs vertically into the other endpoint. When a cell on the route holds a
//! different battery, the horizontal leg is pushed up one row and the route
//! is retried.

use super::geometry::{segment, unique_in_order};
use crate::error::GridResult;
use crate::model::{BatteryId, Entity, Grid, HouseId, Point};
use tracing::warn;

/// Lays one private cable run per connected house. Returns the number of
/// cables laid.
pub fn lay_direct(grid: &mut Grid) -> GridResult<usize> {
    let mut total = 0;
    let connected: Vec<(HouseId, BatteryId)> = grid
        .house_ids()
        .filter_map(|h| grid.house(h).battery().map(|b| (h, b)))
        .collect();

    for (house, battery) in connected {
        let route = detour_route(grid, house, battery);
        total += route.len();
        for point in route {
            grid.push_cable(battery, point, Some(house));
        }
    }
    Ok(total)
}

/// The route from `house` to `battery`, ordered from house to battery.
pub fn detour_route(grid: &Grid, house: HouseId, battery: BatteryId) -> Vec<Point> {
    let start = grid.house(house).position;
    let end = grid.battery(battery).position;
    let house_is_lower = start.y < end.y;
    let (from, to) = if house_is_lower { (start, end) } else { (end, start) };

    let top = grid.index().bounds().map_or(to.y, |(_, max_y)| max_y.max(to.y));
    let max_offset = (top - from.y).max(0) + 1;

    let blocked = |route: &[Point]| {
        grid.index().any_at(route.iter().copied(), |e| {
            matches!(e, Entity::Battery(b) if *b != battery)
        })
    };

    let mut chosen = None;
    for offset in 0..=max_offset {
        let route = l_route(from, to, from.y + offset);
        if !blocked(&route) {
            chosen = Some(route);
            break;
        }
    }
    let mut route = chosen.unwrap_or_else(|| {
        warn!(
            house = grid.house(house).id,
            battery = grid.battery(battery).id,
            "no detour avoids foreign batteries; crossing them"
        );
        l_route(from, to, from.y)
    });

    if !house_is_lower {
        route.reverse();
    }
    route
}

/// Vertical from `from` to `row`, horizontal along `row`, vertical into `to`.
fn l_route(from: Point, to: Point, row: i32) -> Vec<Point> {
    let up = Point::new(from.x, row);
    let across = Point::new(to.x, row);
    unique_in_order(
        segment(from, up)
            .into_iter()
            .chain(segment(up, across))
            .chain(segment(across, to)),
    )
}
