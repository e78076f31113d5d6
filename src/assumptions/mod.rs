//! Planning assumptions: contribution limits and default return suggestions

mod limits;
pub mod loader;

pub use limits::{
    validate_contribution, ContributionCheck, ContributionLimits, CATCH_UP_AGE,
    IRS_401K_LIMIT_50_PLUS, IRS_401K_LIMIT_UNDER_50,
};

use chrono::{Datelike, Utc};
use std::path::Path;

/// Long-term average return suggested for new 401(k) accounts, in percent
pub const DEFAULT_401K_RETURN_RATE: f64 = 7.5;

/// Range of 401(k) returns offered as a suggestion, in percent
pub const DEFAULT_401K_RETURN_RANGE: (f64, f64) = (7.0, 10.0);

/// Container for all planning assumptions
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub limits: ContributionLimits,
    pub default_401k_return: f64,
    pub suggested_401k_range: (f64, f64),
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            limits: ContributionLimits::default(),
            default_401k_return: DEFAULT_401K_RETURN_RATE,
            suggested_401k_range: DEFAULT_401K_RETURN_RANGE,
        }
    }
}

impl Assumptions {
    /// Load limits for the current plan year from the default location
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH), Utc::now().year())
    }

    /// Load limits for `plan_year` from a specific directory
    pub fn from_csv_path(path: &Path, plan_year: i32) -> Result<Self, Box<dyn std::error::Error>> {
        let table = loader::load_contribution_limits(path)?;
        let limits = loader::limits_for_year(&table, plan_year)
            .ok_or_else(|| format!("No contribution limits for plan year {}", plan_year))?;

        Ok(Self {
            limits,
            ..Self::default()
        })
    }

    /// Whether a 401(k) return assumption sits inside the suggested range
    pub fn is_suggested_401k_return(&self, rate: f64) -> bool {
        let (low, high) = self.suggested_401k_range;
        (low..=high).contains(&rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assumptions() {
        let assumptions = Assumptions::default();
        assert_eq!(assumptions.limits.standard, IRS_401K_LIMIT_UNDER_50);
        assert!(assumptions.is_suggested_401k_return(assumptions.default_401k_return));
        assert!(!assumptions.is_suggested_401k_return(12.0));
    }

    #[test]
    fn test_from_csv_path_selects_plan_year() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(loader::DEFAULT_ASSUMPTIONS_PATH);

        let assumptions = Assumptions::from_csv_path(&path, 2024).expect("Failed to load assumptions");
        assert_eq!(assumptions.limits, ContributionLimits::default());

        assert!(Assumptions::from_csv_path(&path, 1990).is_err());
    }
}
