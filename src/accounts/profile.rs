//! Planner profile: the time axis every forecast runs on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidProfileError;

/// Highest current or retirement age a forecast accepts
pub const MAX_AGE: u32 = 120;

/// Salary and retirement details shared by every account forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Age today, in whole years
    pub current_age: u32,

    /// Age at which contributions stop
    pub retirement_age: u32,

    /// Annual salary today
    pub current_salary: f64,

    /// Annual salary growth in percent (3.0 = 3%)
    pub salary_growth_rate: f64,

    /// When the profile was first saved (epoch seconds on the wire)
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(
        current_age: u32,
        retirement_age: u32,
        current_salary: f64,
        salary_growth_rate: f64,
    ) -> Self {
        Self {
            current_age,
            retirement_age,
            current_salary,
            salary_growth_rate,
            created_at: None,
        }
    }

    /// Whole years left before retirement (0 once retired)
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Last year offset of a forecast that runs `post_retirement_years` past retirement
    pub fn horizon_years(&self, post_retirement_years: u32) -> u32 {
        self.years_to_retirement().saturating_add(post_retirement_years)
    }

    /// Attained age `year` years from now
    pub fn age_at(&self, year: u32) -> u32 {
        self.current_age.saturating_add(year)
    }

    /// True once the attained age in `year` has reached retirement
    pub fn is_retired_in(&self, year: u32) -> bool {
        self.age_at(year) >= self.retirement_age
    }

    /// Reject values the engine cannot compound (NaN, infinities)
    pub fn check_finite(&self) -> Result<(), InvalidProfileError> {
        if !self.current_salary.is_finite() {
            return Err(InvalidProfileError::new(
                "currentSalary",
                format!("must be a finite number, got {}", self.current_salary),
            ));
        }
        if !self.salary_growth_rate.is_finite() {
            return Err(InvalidProfileError::new(
                "salaryGrowthRate",
                format!("must be a finite number, got {}", self.salary_growth_rate),
            ));
        }
        Ok(())
    }

    /// Reject ages past `MAX_AGE`; they would make the horizon unbounded
    pub fn check_ages(&self) -> Result<(), InvalidProfileError> {
        if self.current_age > MAX_AGE {
            return Err(InvalidProfileError::new(
                "currentAge",
                format!("must be at most {}, got {}", MAX_AGE, self.current_age),
            ));
        }
        if self.retirement_age > MAX_AGE {
            return Err(InvalidProfileError::new(
                "retirementAge",
                format!("must be at most {}, got {}", MAX_AGE, self.retirement_age),
            ));
        }
        Ok(())
    }

    /// Save-time bound checks applied before a profile is stored
    pub fn validate(&self) -> Result<(), InvalidProfileError> {
        self.check_finite()?;
        self.check_ages()?;

        if self.current_age == 0 {
            return Err(InvalidProfileError::new("currentAge", "must be greater than 0"));
        }
        if self.retirement_age <= self.current_age {
            return Err(InvalidProfileError::new(
                "retirementAge",
                "must be greater than currentAge",
            ));
        }
        if self.current_salary < 0.0 {
            return Err(InvalidProfileError::new("currentSalary", "must be 0 or greater"));
        }
        if self.salary_growth_rate < 0.0 {
            return Err(InvalidProfileError::new(
                "salaryGrowthRate",
                "must be 0 or greater",
            ));
        }
        Ok(())
    }
}
