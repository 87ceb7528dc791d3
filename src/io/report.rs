//! Layout report.
//!
//! The report is a JSON array: a summary object with the district number
//! and total cost, followed by one object per battery listing its houses and
//! the cable cells each house uses.

use crate::cost::Cost;
use crate::error::GridResult;
use crate::model::Grid;
use crate::route::RoutingStrategy;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Write;

/// Cable cells used by one house, ordered from the house to its battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseReport {
    pub location: String,
    pub output: f64,
    pub cables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReport {
    pub location: String,
    pub capacity: f64,
    pub houses: Vec<HouseReport>,
}

/// District number and total cost. The cost key depends on the routing
/// strategy; an infeasible cost is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub district: u32,
    #[serde(
        rename = "costs-shared",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "present"
    )]
    pub costs_shared: Option<Option<i64>>,
    #[serde(
        rename = "costs-own",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "present"
    )]
    pub costs_own: Option<Option<i64>>,
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// One element of the report array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Summary(Summary),
    Battery(BatteryReport),
}

/// Complete layout report for one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Builds the report from a routed grid whose houses carry their cables.
    pub fn build(district: u32, grid: &Grid, cost: Cost, strategy: RoutingStrategy) -> Self {
        let value = Some(cost.value());
        let summary = match strategy {
            RoutingStrategy::Shared => Summary {
                district,
                costs_shared: value,
                costs_own: None,
            },
            RoutingStrategy::Direct => Summary {
                district,
                costs_shared: None,
                costs_own: value,
            },
        };

        let mut entries = vec![ReportEntry::Summary(summary)];
        for battery in grid.batteries() {
            let houses = battery
                .houses()
                .iter()
                .map(|&h| {
                    let house = grid.house(h);
                    HouseReport {
                        location: house.position.to_string(),
                        output: house.energy,
                        cables: house
                            .cables()
                            .iter()
                            .map(|&c| grid.cable(c).position.to_string())
                            .collect(),
                    }
                })
                .collect();
            entries.push(ReportEntry::Battery(BatteryReport {
                location: battery.position.to_string(),
                capacity: battery.capacity,
                houses,
            }));
        }
        Self { entries }
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.entries.iter().find_map(|e| match e {
            ReportEntry::Summary(s) => Some(s),
            ReportEntry::Battery(_) => None,
        })
    }

    pub fn batteries(&self) -> impl Iterator<Item = &BatteryReport> {
        self.entries.iter().filter_map(|e| match e {
            ReportEntry::Battery(b) => Some(b),
            ReportEntry::Summary(_) => None,
        })
    }

    pub fn to_json(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> GridResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
