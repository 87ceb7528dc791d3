//! Property tests over randomly generated districts.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use u_smartgrid::anneal::AnnealConfig;
use u_smartgrid::assign::Assigner;
use u_smartgrid::model::{
    BatteryId, BatteryRecord, Grid, HouseId, HouseRecord, Point, ENERGY_EPSILON,
};
use u_smartgrid::rebalance::{RebalanceConfig, Rebalancer};
use u_smartgrid::route::{Router, RoutingStrategy};
use u_smartgrid::solver::{SmartGrid, SolverConfig};

fn house_strategy() -> impl Strategy<Value = HouseRecord> {
    (0i32..25, 0i32..25, 1u32..120).prop_map(|(x, y, e)| HouseRecord {
        x,
        y,
        energy: e as f64 + 0.25,
    })
}

fn battery_strategy() -> impl Strategy<Value = BatteryRecord> {
    (0i32..25, 0i32..25, 100u32..600).prop_map(|(x, y, c)| BatteryRecord {
        x,
        y,
        capacity: c as f64,
    })
}

fn district() -> impl Strategy<Value = (Vec<HouseRecord>, Vec<BatteryRecord>)> {
    (
        prop::collection::vec(house_strategy(), 1..18),
        prop::collection::vec(battery_strategy(), 1..5),
    )
}

/// Whether `cells` form one 4-connected region.
fn is_connected(cells: &[Point]) -> bool {
    let set: HashSet<Point> = cells.iter().copied().collect();
    let Some(&start) = cells.first() else {
        return true;
    };
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        for n in p.neighbors() {
            if set.contains(&n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen.len() == set.len()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn capacity_holds_after_assignment_and_rebalancing((houses, batteries) in district()) {
        let mut grid = Grid::new(&houses, &batteries);
        let assigned = Assigner::run(&mut grid).unwrap();
        Rebalancer::run(&mut grid, &assigned.unplaced, &RebalanceConfig::default()).unwrap();

        prop_assert!(grid.check_invariants().is_ok());
        for battery in grid.batteries() {
            prop_assert!(battery.remaining() >= -ENERGY_EPSILON);
            let used: f64 = battery.houses().iter().map(|&h| grid.house(h).energy).sum();
            prop_assert!((battery.capacity - used - battery.remaining()).abs() <= ENERGY_EPSILON);
        }
    }

    #[test]
    fn add_then_remove_restores_battery(
        (houses, batteries) in district(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut grid = Grid::new(&houses, &batteries);
        Assigner::run(&mut grid).unwrap();

        let free: Vec<HouseId> = grid.unplaced_houses();
        let target = BatteryId(pick.index(grid.batteries().len()));
        let candidate = free
            .into_iter()
            .find(|&h| grid.house(h).check_connection(grid.battery(target)));
        if let Some(house) = candidate {
            let before = grid.battery(target).clone();
            grid.add_house(target, house).unwrap();
            grid.remove_house(target, house).unwrap();
            let after = grid.battery(target);
            prop_assert_eq!(after.remaining().to_bits(), before.remaining().to_bits());
            prop_assert_eq!(after.houses(), before.houses());
            prop_assert_eq!(after.fragments(), before.fragments());
            prop_assert_eq!(grid.house(house).battery(), None);
        }
    }

    #[test]
    fn shared_routing_merges_into_one_connected_tree((houses, batteries) in district()) {
        let mut grid = Grid::new(&houses, &batteries);
        Assigner::run(&mut grid).unwrap();
        Router::route_all(&mut grid, RoutingStrategy::Shared).unwrap();
        Router::attribute_cables(&mut grid, RoutingStrategy::Shared).unwrap();

        prop_assert!(grid.check_invariants().is_ok());
        for battery in grid.batteries() {
            prop_assert_eq!(battery.fragment_count(), 1);
            let path = battery.merged_path().unwrap();
            prop_assert!(path.contains(&battery.position));
            for &h in battery.houses() {
                prop_assert!(path.contains(&grid.house(h).position));
            }
            prop_assert!(is_connected(path));
        }
    }

    #[test]
    fn best_cost_never_increases((houses, batteries) in district(), seed in any::<u64>()) {
        let config = SolverConfig::default()
            .with_anneal(AnnealConfig::default().with_iterations(60).with_seed(seed));
        let layout = SmartGrid::new(1, &houses, &batteries, config)
            .unwrap()
            .optimize()
            .unwrap();

        let stats = layout.stats();
        prop_assert!(layout.total_cost() <= stats.initial_cost);
        for pair in stats.cost_history.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
        prop_assert_eq!(layout.total_cost().is_feasible(), layout.unplaced().is_empty());
    }
}
