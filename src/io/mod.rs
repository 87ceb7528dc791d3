//! Input loading and layout reporting.

pub mod loader;
pub mod report;

pub use loader::{district_paths, load_batteries, load_houses, read_batteries, read_houses};
pub use report::{BatteryReport, HouseReport, Report, ReportEntry, Summary};
