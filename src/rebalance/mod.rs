//! Capacity rebalancing for houses the greedy pass could not place.
//!
//! Only a battery's lowest-priority houses (the most recently connected)
//! are ever moved, so houses placed early, which had the fewest good
//! options, keep their nearest battery.

mod config;
mod runner;

pub use config::RebalanceConfig;
pub use runner::{RebalanceResult, Rebalancer};
