//! Smart-grid layout optimization.
//!
//! Connects houses with a fixed energy output to capacity-limited batteries
//! on an integer grid and lays cables between them, minimizing
//! `cable_cost × cables + battery_cost × batteries`:
//!
//! - **Assignment**: Priority-ordered greedy placement onto the nearest
//!   battery with room.
//! - **Rebalancing**: Moves and swaps low-priority houses to make room for
//!   houses the greedy pass could not place.
//! - **Routing**: Shared Manhattan cable networks grown by repeatedly
//!   joining the two closest fragments, or per-house routes that avoid
//!   foreign batteries.
//! - **Simulated Annealing**: Random house swaps between batteries,
//!   re-routed and accepted under a cooling schedule.
//! - **Random baseline**: Random assignment with corner routes, sampled
//!   many times for a failure rate and cost spread to compare against.
//!
//! # Architecture
//!
//! A [`model::Grid`] owns every house, battery and cable in arenas indexed
//! by typed ids, plus a [`spatial::SpatialIndex`] of cell occupants.
//! Each stage mutates the grid through its pairing operations, which keep
//! the capacity equation and ownership invariants intact.
//! [`solver::SmartGrid`] chains the stages for one district.

pub mod anneal;
pub mod assign;
pub mod baseline;
pub mod cost;
pub mod error;
pub mod io;
pub mod model;
pub mod rebalance;
pub mod route;
pub mod solver;
pub mod spatial;

pub use error::{GridError, GridResult};
