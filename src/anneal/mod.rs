//! Simulated annealing over house-to-battery swaps.
//!
//! Starting from a feasible assignment, repeatedly exchanges one house
//! between two random batteries, re-routes, and keeps or rolls back the
//! change. Non-improving moves are accepted with a probability that follows
//! a cooling schedule independent of the cost delta.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod config;
mod runner;
mod types;

pub use config::{AnnealConfig, CoolingSchedule};
pub use runner::{AnnealResult, Annealer, Swap};
pub use types::{LayoutCost, RoutedCost};
