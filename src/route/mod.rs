//! Rectilinear cable routing.
//!
//! Every battery starts with one path fragment for itself and one per
//! connected house. [`merge_all`] joins the two closest fragments with an
//! L-shaped connector until a single tree remains, then [`Router`] lays one
//! cable per cell of that tree. [`RoutingStrategy::Direct`] instead gives
//! each house a private cable run that detours around foreign batteries.

mod direct;
mod geometry;
mod merge;
mod runner;
mod trace;

pub use direct::{detour_route, lay_direct};
pub use geometry::{closest_points, connector, segment, set_distance, unique_in_order, Orientation};
pub use merge::{create_merged_path, merge_all, merge_two_fragments, MergeState};
pub use runner::{Router, RoutingStrategy};
pub use trace::trace_house_cables;
