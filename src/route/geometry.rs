//! Rectilinear geometry helpers.

use crate::model::Point;
use std::collections::HashSet;

/// Which leg of an L-shaped connector is drawn at the first point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Vertical leg through the first point, horizontal leg through the second.
    VerticalFirst,
    /// Horizontal leg through the first point, vertical leg through the second.
    HorizontalFirst,
}

/// Drops repeated points, keeping the first occurrence of each.
pub fn unique_in_order<I: IntoIterator<Item = Point>>(points: I) -> Vec<Point> {
    let mut seen = HashSet::new();
    points.into_iter().filter(|p| seen.insert(*p)).collect()
}

/// The closest pair `(a ∈ first, b ∈ second)` and its distance.
///
/// Scans `first` in the outer loop and `second` in the inner loop; on ties
/// the pair found first wins. Returns `None` if either side is empty.
pub fn closest_points(first: &[Point], second: &[Point]) -> Option<(u32, Point, Point)> {
    let mut best: Option<(u32, Point, Point)> = None;
    for &a in first {
        for &b in second {
            let d = a.manhattan(b);
            if best.is_none_or(|(min, _, _)| d < min) {
                best = Some((d, a, b));
            }
        }
    }
    best
}

/// Minimum distance between two point sets.
pub fn set_distance(first: &[Point], second: &[Point]) -> Option<u32> {
    closest_points(first, second).map(|(d, _, _)| d)
}

/// An L-shaped path from `from` to `to` covering `|dx| + |dy| + 1` cells.
///
/// Both legs are emitted in ascending coordinate order, vertical leg first,
/// with the shared corner cell kept only once.
pub fn connector(from: Point, to: Point, orientation: Orientation) -> Vec<Point> {
    let (lo_x, hi_x) = (from.x.min(to.x), from.x.max(to.x));
    let (lo_y, hi_y) = (from.y.min(to.y), from.y.max(to.y));

    let (vertical_x, horizontal_y) = match orientation {
        Orientation::VerticalFirst => (from.x, to.y),
        Orientation::HorizontalFirst => (to.x, from.y),
    };
    let vertical = (lo_y..=hi_y).map(|y| Point::new(vertical_x, y));
    let horizontal = (lo_x..=hi_x).map(|x| Point::new(x, horizontal_y));
    unique_in_order(vertical.chain(horizontal))
}

/// Inclusive axis-aligned segment walked from `a` to `b`.
///
/// `a` and `b` must share a row or a column.
pub fn segment(a: Point, b: Point) -> Vec<Point> {
    debug_assert!(a.x == b.x || a.y == b.y, "segment must be axis aligned");
    let steps = a.manhattan(b) as i32;
    let dx = (b.x - a.x).signum();
    let dy = (b.y - a.y).signum();
    (0..=steps)
        .map(|i| Point::new(a.x + dx * i, a.y + dy * i))
        .collect()
}
