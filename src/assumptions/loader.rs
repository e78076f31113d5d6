//! CSV-based assumption loader
//!
//! Loads yearly contribution limits from data/assumptions/

use super::ContributionLimits;
use super::limits::CATCH_UP_AGE;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File holding `year,under_50,fifty_plus` rows
pub const CONTRIBUTION_LIMITS_FILE: &str = "contribution_limits.csv";

/// Load contribution limits from CSV
/// Returns BTreeMap<plan_year, limits>
pub fn load_contribution_limits(path: &Path) -> Result<BTreeMap<i32, ContributionLimits>, Box<dyn Error>> {
    let file = File::open(path.join(CONTRIBUTION_LIMITS_FILE))?;
    load_contribution_limits_from_reader(file)
}

/// Load contribution limits from any reader
pub fn load_contribution_limits_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<BTreeMap<i32, ContributionLimits>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut table = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let year: i32 = record[0].trim().parse()?;
        let standard: f64 = record[1].trim().parse()?;
        let catch_up: f64 = record[2].trim().parse()?;

        if catch_up < standard {
            return Err(format!("Plan year {}: catch-up limit below standard limit", year).into());
        }

        table.insert(
            year,
            ContributionLimits {
                standard,
                catch_up,
                catch_up_age: CATCH_UP_AGE,
            },
        );
    }

    Ok(table)
}

/// Limits in force for `plan_year`: the latest entry not after it
pub fn limits_for_year(table: &BTreeMap<i32, ContributionLimits>, plan_year: i32) -> Option<ContributionLimits> {
    table.range(..=plan_year).next_back().map(|(_, limits)| *limits)
}
