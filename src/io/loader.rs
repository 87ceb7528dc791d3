//! CSV loading of house and battery records.
//!
//! Files have a header row followed by one entity per row. Houses are
//! `x,y,energy`. Batteries are either `x,y,capacity` or use a single quoted
//! position field: `"x,y",capacity`.

use crate::error::{GridError, GridResult};
use crate::model::{BatteryRecord, HouseRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Paths of the house and battery files for district `n` under `root`,
/// following the `district_<n>/district-<n>_{houses,batteries}.csv` layout.
pub fn district_paths(root: &Path, district: u32) -> (PathBuf, PathBuf) {
    let dir = root.join(format!("district_{district}"));
    (
        dir.join(format!("district-{district}_houses.csv")),
        dir.join(format!("district-{district}_batteries.csv")),
    )
}

pub fn load_houses(path: &Path) -> GridResult<Vec<HouseRecord>> {
    read_houses(File::open(path)?)
}

pub fn load_batteries(path: &Path) -> GridResult<Vec<BatteryRecord>> {
    read_batteries(File::open(path)?)
}

pub fn read_houses<R: Read>(reader: R) -> GridResult<Vec<HouseRecord>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|(x, y, energy)| HouseRecord { x, y, energy })
        .collect())
}

pub fn read_batteries<R: Read>(reader: R) -> GridResult<Vec<BatteryRecord>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|(x, y, capacity)| BatteryRecord { x, y, capacity })
        .collect())
}

/// Parses every data row into `(x, y, value)`.
fn read_rows<R: Read>(reader: R) -> GridResult<Vec<(i32, i32, f64)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let fields: Vec<&str> = record.iter().collect();
        let (x, y, value) = match fields.as_slice() {
            [x, y, value, ..] if !x.contains(',') => (*x, *y, *value),
            [position, value, ..] => {
                let (x, y) = position
                    .split_once(',')
                    .ok_or_else(|| malformed(row, "position must be \"x,y\""))?;
                (x.trim(), y.trim(), *value)
            }
            _ => return Err(malformed(row, "expected x, y and a value")),
        };
        rows.push((
            parse_coord(row, "x", x)?,
            parse_coord(row, "y", y)?,
            parse_amount(row, value)?,
        ));
    }
    Ok(rows)
}

fn malformed(row: usize, reason: impl Into<String>) -> GridError {
    GridError::MalformedRecord {
        row,
        reason: reason.into(),
    }
}

fn parse_coord(row: usize, name: &str, raw: &str) -> GridResult<i32> {
    raw.parse()
        .map_err(|e| malformed(row, format!("{name} {raw:?}: {e}")))
}

fn parse_amount(row: usize, raw: &str) -> GridResult<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|e| malformed(row, format!("value {raw:?}: {e}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed(row, format!("value {raw:?} must be a non-negative number")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_houses() {
        let data = "x,y,maxoutput\n38,12,61.09\n43,13,42.33\n";
        let houses = read_houses(data.as_bytes()).unwrap();
        assert_eq!(houses.len(), 2);
        assert_eq!(houses[0], HouseRecord { x: 38, y: 12, energy: 61.09 });
    }

    #[test]
    fn test_read_batteries_quoted_position() {
        let data = "positie,capaciteit\n\"38,12\",1507.0\n\"43, 13\",1508.25\n";
        let batteries = read_batteries(data.as_bytes()).unwrap();
        assert_eq!(
            batteries,
            vec![
                BatteryRecord { x: 38, y: 12, capacity: 1507.0 },
                BatteryRecord { x: 43, y: 13, capacity: 1508.25 },
            ]
        );
    }

    #[test]
    fn test_read_batteries_plain_columns() {
        let data = "x,y,capacity\n1,2,300\n";
        let batteries = read_batteries(data.as_bytes()).unwrap();
        assert_eq!(batteries[0], BatteryRecord { x: 1, y: 2, capacity: 300.0 });
    }

    #[test]
    fn test_malformed_number_reports_row() {
        let data = "x,y,maxoutput\n1,2,3\n4,five,6\n";
        match read_houses(data.as_bytes()) {
            Err(GridError::MalformedRecord { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("five"), "{reason}");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_energy_rejected() {
        let data = "x,y,maxoutput\n1,2,-3\n";
        assert!(matches!(
            read_houses(data.as_bytes()),
            Err(GridError::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_short_row_rejected() {
        let data = "x,y,maxoutput\n7\n";
        assert!(matches!(
            read_houses(data.as_bytes()),
            Err(GridError::MalformedRecord { row: 1, .. })
        ));
    }

    #[test]
    fn test_district_paths() {
        let (houses, batteries) = district_paths(Path::new("data"), 2);
        assert_eq!(houses, Path::new("data/district_2/district-2_houses.csv"));
        assert_eq!(batteries, Path::new("data/district_2/district-2_batteries.csv"));
    }
}
