//! Greedy house→battery assignment.
//!
//! Houses are scored by how constrained they are (see [`priority_spread`]),
//! sorted most-constrained first, and each is connected to the nearest
//! battery that still has room. Houses that fit nowhere are handed on to the
//! [`rebalance`](crate::rebalance) stage.

mod priority;
mod runner;

pub use priority::{compute_priorities, placement_order, priority_spread, PRIORITY_RANK};
pub use runner::{AssignResult, Assigner};
