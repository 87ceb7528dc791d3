//! Random baseline layouts.
//!
//! Shuffles the houses, sends each to a random battery (falling through to
//! the next battery in cyclic order when it is full) and lays a private
//! corner route that stops where it meets a cable already leading to the
//! same battery. Repeated runs give the failure rate and cost spread any
//! optimizer should beat.

mod config;
mod runner;

pub use config::BaselineConfig;
pub use runner::{corner_route, BaselineSummary, RandomBaseline};
