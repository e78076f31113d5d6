//! Statutory 401(k) contribution limits and the advisory limit check

use serde::{Deserialize, Serialize};

/// 2024 employee deferral limit below the catch-up age
pub const IRS_401K_LIMIT_UNDER_50: f64 = 23_000.0;

/// 2024 employee deferral limit including catch-up contributions
pub const IRS_401K_LIMIT_50_PLUS: f64 = 30_500.0;

/// Age from which catch-up contributions are allowed
pub const CATCH_UP_AGE: u32 = 50;

/// Annual contribution limits for one plan year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionLimits {
    /// Limit before the catch-up age
    pub standard: f64,

    /// Limit from the catch-up age on
    pub catch_up: f64,

    /// Age at which the catch-up limit applies
    pub catch_up_age: u32,
}

impl Default for ContributionLimits {
    fn default() -> Self {
        Self {
            standard: IRS_401K_LIMIT_UNDER_50,
            catch_up: IRS_401K_LIMIT_50_PLUS,
            catch_up_age: CATCH_UP_AGE,
        }
    }
}

impl ContributionLimits {
    /// Limit applying to someone who is `age` at the end of the horizon
    pub fn limit_for_age(&self, age: f64) -> f64 {
        if age >= self.catch_up_age as f64 {
            self.catch_up
        } else {
            self.standard
        }
    }

    /// Check a monthly contribution against the limit that applies at the
    /// end of the horizon
    pub fn check(&self, monthly_contribution: f64, current_age: u32, time_horizon: f64) -> ContributionCheck {
        let annual_contribution = monthly_contribution * 12.0;
        let age_at_end = current_age as f64 + time_horizon;
        let limit = self.limit_for_age(age_at_end);

        ContributionCheck {
            is_valid: annual_contribution <= limit,
            annual_contribution,
            limit,
            exceeds_by: if annual_contribution > limit {
                annual_contribution - limit
            } else {
                0.0
            },
        }
    }
}

/// Outcome of a contribution-limit check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCheck {
    pub is_valid: bool,
    pub annual_contribution: f64,
    pub limit: f64,
    pub exceeds_by: f64,
}

/// Check a monthly 401(k) contribution against the default limits
///
/// Advisory only: the result is meant for display while a contribution is
/// being edited, and never fails.
///
/// Only the age reached at the end of `time_horizon` selects the limit. The
/// planner profile plays no part in the rule, so it is not taken here; use
/// [`ContributionLimits::check`] to check against other limits.
pub fn validate_contribution(monthly_contribution: f64, current_age: u32, time_horizon: f64) -> ContributionCheck {
    ContributionLimits::default().check(monthly_contribution, current_age, time_horizon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_50_limit_at_end_of_horizon() {
        // Ends the horizon at 49
        let check = validate_contribution(2_000.0, 48, 1.0);
        assert_eq!(check.annual_contribution, 24_000.0);
        assert_eq!(check.limit, 23_000.0);
        assert!(!check.is_valid);
        assert_eq!(check.exceeds_by, 1_000.0);
    }

    #[test]
    fn test_catch_up_limit_from_age_50() {
        let check = validate_contribution(2_000.0, 49, 1.0);
        assert_eq!(check.limit, 30_500.0);
        assert!(check.is_valid);
        assert_eq!(check.exceeds_by, 0.0);
    }

    #[test]
    fn test_only_age_at_end_of_horizon_matters() {
        assert_eq!(validate_contribution(2_000.0, 45, 5.0), validate_contribution(2_000.0, 49, 1.0));
        assert_eq!(
            validate_contribution(2_500.0, 30, 19.5),
            ContributionLimits::default().check(2_500.0, 40, 9.5)
        );
    }

    #[test]
    fn test_exactly_at_limit_is_valid() {
        let limits = ContributionLimits {
            standard: 24_000.0,
            ..ContributionLimits::default()
        };
        let check = limits.check(2_000.0, 30, 5.0);
        assert!(check.is_valid);
        assert_eq!(check.exceeds_by, 0.0);
    }

    #[test]
    fn test_zero_and_negative_contributions_never_fail() {
        let zero = validate_contribution(0.0, 30, 0.0);
        assert!(zero.is_valid);
        assert_eq!(zero.exceeds_by, 0.0);

        let negative = validate_contribution(-100.0, 30, 0.0);
        assert!(negative.is_valid);
        assert_eq!(negative.annual_contribution, -1_200.0);
        assert_eq!(negative.exceeds_by, 0.0);
    }

    #[test]
    fn test_custom_limits() {
        let limits = ContributionLimits {
            standard: 23_500.0,
            catch_up: 31_000.0,
            catch_up_age: 50,
        };
        let check = limits.check(2_000.0, 40, 2.5);
        assert_eq!(check.limit, 23_500.0);
        assert_eq!(check.exceeds_by, 500.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(validate_contribution(2_000.0, 48, 1.0)).unwrap();
        assert_eq!(value["isValid"], false);
        assert_eq!(value["exceedsBy"], 1_000.0);
    }
}
