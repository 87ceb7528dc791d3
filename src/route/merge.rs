//! Nearest-fragment agglomeration of a battery's path fragments.
//!
//! Each step joins the two closest fragments with an L-shaped connector,
//! like single-linkage clustering under the rectilinear metric. The result
//! is a connected, approximately minimal cable tree, not an exact Steiner
//! tree.

use super::geometry::{closest_points, connector, set_distance, unique_in_order, Orientation};
use crate::model::{Battery, Point};

/// Pairwise fragment distances, kept up to date across merges so each step
/// only rescans the new connector.
#[derive(Debug, Clone)]
pub struct MergeState {
    distances: Vec<Vec<u32>>,
}

impl MergeState {
    pub fn new(fragments: &[Vec<Point>]) -> Self {
        let n = fragments.len();
        let mut distances = vec![vec![0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = set_distance(&fragments[i], &fragments[j]).unwrap_or(u32::MAX);
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }
        Self { distances }
    }

    /// The closest fragment pair `(i, j)` with `i < j`; the first pair in
    /// scan order wins ties.
    pub fn closest_pair(&self) -> Option<(usize, usize)> {
        let n = self.distances.len();
        let mut best: Option<(u32, usize, usize)> = None;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distances[i][j];
                if best.is_none_or(|(min, _, _)| d < min) {
                    best = Some((d, i, j));
                }
            }
        }
        best.map(|(_, i, j)| (i, j))
    }

    /// Merges the closest pair. Returns `false` once one fragment remains.
    pub fn merge_next(&mut self, fragments: &mut Vec<Vec<Point>>) -> bool {
        debug_assert_eq!(self.distances.len(), fragments.len());
        let Some((i, j)) = self.closest_pair() else {
            return false;
        };

        let n = fragments.len();
        let (_, bridge_distances) = merge_two_fragments(fragments, i, j);
        let mut via_bridge = vec![u32::MAX; n];
        for (k, d) in bridge_distances {
            via_bridge[k] = d;
        }

        for k in (0..n).filter(|&k| k != i && k != j) {
            let merged = self.distances[i][k]
                .min(self.distances[j][k])
                .min(via_bridge[k]);
            self.distances[j][k] = merged;
            self.distances[k][j] = merged;
        }
        self.distances.remove(i);
        for row in &mut self.distances {
            row.remove(i);
        }
        true
    }
}

/// Joins fragments `i` and `j` (`i < j`) in place.
///
/// The merged fragment `fragments[j] + fragments[i] + connector` (without
/// repeats) replaces `fragments[j]`, then `fragments[i]` is removed, so the
/// merged fragment ends up at index `j - 1`. The
/// connector runs between the closest points of the two fragments; when
/// other fragments remain, the orientation closer to them is preferred.
///
/// Returns the connector and its distance to every other fragment, keyed by
/// the fragment's index before removal.
pub fn merge_two_fragments(
    fragments: &mut Vec<Vec<Point>>,
    i: usize,
    j: usize,
) -> (Vec<Point>, Vec<(usize, u32)>) {
    debug_assert!(i < j && j < fragments.len());
    let (bridge, bridge_distances) = match closest_points(&fragments[i], &fragments[j]) {
        Some((_, from, to)) => choose_connector(fragments, i, j, from, to),
        None => (Vec::new(), Vec::new()),
    };

    let first = fragments.remove(i);
    let second = std::mem::take(&mut fragments[j - 1]);
    let before = first.len().max(second.len());
    let merged = unique_in_order(second.into_iter().chain(first).chain(bridge.iter().copied()));
    debug_assert!(merged.len() >= before, "merge dropped points");
    fragments[j - 1] = merged;

    (bridge, bridge_distances)
}

/// Picks the connector orientation between `from` and `to`.
///
/// With two or fewer fragments both are equivalent and the vertical-first
/// path is used. Otherwise the path whose minimum distance to any other
/// fragment is smaller wins; ties go to horizontal-first.
fn choose_connector(
    fragments: &[Vec<Point>],
    i: usize,
    j: usize,
    from: Point,
    to: Point,
) -> (Vec<Point>, Vec<(usize, u32)>) {
    let vertical = connector(from, to, Orientation::VerticalFirst);
    if fragments.len() <= 2 {
        return (vertical, Vec::new());
    }
    let horizontal = connector(from, to, Orientation::HorizontalFirst);

    let to_others = |path: &[Point]| -> Vec<(usize, u32)> {
        fragments
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != i && k != j)
            .map(|(k, f)| (k, set_distance(path, f).unwrap_or(u32::MAX)))
            .collect()
    };
    let vertical_distances = to_others(&vertical);
    let horizontal_distances = to_others(&horizontal);

    let nearest = |ds: &[(usize, u32)]| ds.iter().map(|&(_, d)| d).min().unwrap_or(u32::MAX);
    if nearest(&vertical_distances) < nearest(&horizontal_distances) {
        (vertical, vertical_distances)
    } else {
        (horizontal, horizontal_distances)
    }
}

/// Performs one merge step on `battery`.
///
/// Reduces the fragment count by exactly one; returns `false` and leaves the
/// battery untouched when it already has a single fragment.
pub fn create_merged_path(battery: &mut Battery) -> bool {
    let mut state = MergeState::new(&battery.fragments);
    state.merge_next(&mut battery.fragments)
}

/// Merges until `battery` has a single fragment. Returns the number of
/// merges performed.
pub fn merge_all(battery: &mut Battery) -> usize {
    let mut state = MergeState::new(&battery.fragments);
    let mut merges = 0;
    while state.merge_next(&mut battery.fragments) {
        merges += 1;
    }
    merges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn battery_with(points: &[Point]) -> Battery {
        let mut battery = Battery::new(1, points[0], 1000.0);
        battery.fragments = points.iter().map(|&q| vec![q]).collect();
        battery
    }

    #[test]
    fn test_two_singletons_merge_into_l_path() {
        let mut battery = battery_with(&[p(0, 0), p(3, 4)]);
        assert!(create_merged_path(&mut battery));
        let path = battery.merged_path().expect("single fragment");
        assert_eq!(path.len(), 8);
        assert!(path.contains(&p(0, 0)));
        assert!(path.contains(&p(3, 4)));
        // Vertical-first for the last merge.
        assert!(path.contains(&p(0, 4)));
    }

    #[test]
    fn test_merge_on_single_fragment_is_noop() {
        let mut battery = battery_with(&[p(2, 2)]);
        assert!(!create_merged_path(&mut battery));
        assert_eq!(battery.fragments(), &[vec![p(2, 2)]]);
    }

    #[test]
    fn test_each_step_removes_one_fragment() {
        let mut battery = battery_with(&[p(0, 0), p(5, 1), p(2, 7), p(9, 9), p(4, 4)]);
        for expected in (1..5).rev() {
            assert!(create_merged_path(&mut battery));
            assert_eq!(battery.fragment_count(), expected);
        }
        assert!(!create_merged_path(&mut battery));
    }

    #[test]
    fn test_closest_pair_merged_first() {
        let mut fragments = vec![vec![p(0, 0)], vec![p(10, 10)], vec![p(11, 10)]];
        let mut state = MergeState::new(&fragments);
        assert_eq!(state.closest_pair(), Some((1, 2)));
        assert!(state.merge_next(&mut fragments));
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], vec![p(0, 0)]);
        assert_eq!(fragments[1], vec![p(11, 10), p(10, 10)]);
    }

    #[test]
    fn test_merged_fragment_takes_later_slot() {
        let mut fragments = vec![vec![p(0, 0)], vec![p(1, 0)], vec![p(20, 20)], vec![p(0, 3)]];
        merge_two_fragments(&mut fragments, 0, 3);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], vec![p(1, 0)]);
        assert_eq!(fragments[1], vec![p(20, 20)]);
        // Later fragment first, then the earlier one, then the connector.
        assert_eq!(fragments[2], vec![p(0, 3), p(0, 0), p(0, 1), p(0, 2)]);
    }

    #[test]
    fn test_orientation_prefers_path_near_other_fragments() {
        // Joining (0,0)-(4,4): vertical-first passes (0,4), horizontal-first
        // passes (4,0). A third fragment near (4,0) favours horizontal-first.
        let mut fragments = vec![vec![p(0, 0)], vec![p(4, 4)], vec![p(6, 0)]];
        let (bridge, _) = merge_two_fragments(&mut fragments, 0, 1);
        assert!(bridge.contains(&p(4, 0)));
        assert!(!bridge.contains(&p(0, 4)));
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn test_incremental_distances_match_recomputed() {
        let mut fragments: Vec<Vec<Point>> = [p(0, 0), p(8, 2), p(3, 9), p(7, 7), p(1, 5), p(12, 0)]
            .iter()
            .map(|&q| vec![q])
            .collect();
        let mut state = MergeState::new(&fragments);
        while state.merge_next(&mut fragments) {
            let fresh = MergeState::new(&fragments);
            assert_eq!(state.distances, fresh.distances);
        }
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_merge_all_covers_every_point() {
        let points = [p(0, 0), p(5, 1), p(2, 7), p(9, 9), p(4, 4), p(4, 4)];
        let mut battery = battery_with(&points);
        assert_eq!(merge_all(&mut battery), 5);
        let path = battery.merged_path().unwrap();
        for q in points {
            assert!(path.contains(&q), "missing {q}");
        }
    }
}
