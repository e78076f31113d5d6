//! Core forecast engine: one yearly projection loop shared by the four
//! account-type simulators, and the dispatcher that picks between them

use super::rows::{Forecast, ProjectionRow};
use super::state::{MonthPlan, ProjectionState, YearTotals};
use crate::accounts::{Account, AccountKind, BrokerageTerms, DividendTerms, HysaTerms, Profile, Retirement401kTerms};
use crate::error::ForecastError;

/// Years projected past the retirement age
pub const DEFAULT_POST_RETIREMENT_YEARS: u32 = 20;

/// Longest run past retirement a config may ask for
pub const MAX_POST_RETIREMENT_YEARS: u32 = 100;

/// Percentage points added/removed for the optimistic/pessimistic scenarios
pub const DEFAULT_VARIANCE_OFFSET: f64 = 2.0;

/// Configuration for a forecast run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    /// Years to keep projecting after retirement
    pub post_retirement_years: u32,

    /// Offset in percentage points for the high/low scenarios
    pub variance_offset: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            post_retirement_years: DEFAULT_POST_RETIREMENT_YEARS,
            variance_offset: DEFAULT_VARIANCE_OFFSET,
        }
    }
}

impl ForecastConfig {
    /// Reject settings that would make a forecast unbounded or non-finite
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.post_retirement_years > MAX_POST_RETIREMENT_YEARS {
            return Err(ForecastError::InvalidConfig {
                field: "postRetirementYears",
                reason: format!(
                    "must be at most {}, got {}",
                    MAX_POST_RETIREMENT_YEARS, self.post_retirement_years
                ),
            });
        }
        if !self.variance_offset.is_finite() {
            return Err(ForecastError::InvalidConfig {
                field: "varianceOffset",
                reason: format!("must be a finite number, got {}", self.variance_offset),
            });
        }
        Ok(())
    }
}

/// Monthly decimal rate for an annual percentage shifted by `variance` points
fn monthly_rate(annual_percent: f64, variance: f64) -> f64 {
    (annual_percent + variance) / 100.0 / 12.0
}

/// Main forecast engine
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    /// Create a new engine with the given config
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast any account, routing on its type
    ///
    /// Unsupported account types yield an empty forecast rather than an
    /// error, whatever their fields hold. For the others, non-finite
    /// numbers, ages past `MAX_AGE` and out-of-range config are rejected.
    pub fn forecast_for(&self, account: &Account, profile: &Profile, variance: f64) -> Result<Forecast, ForecastError> {
        if matches!(account.kind, AccountKind::Unsupported) {
            log::warn!("Account {}: unsupported account type, no forecast", account.id);
            return Ok(Forecast::uncomputable(account));
        }

        self.config.validate()?;
        if !variance.is_finite() {
            return Err(ForecastError::InvalidConfig {
                field: "variance",
                reason: format!("must be a finite number, got {}", variance),
            });
        }
        profile.check_finite()?;
        profile.check_ages()?;
        account.check_finite()?;

        let forecast = match &account.kind {
            AccountKind::Retirement401k(terms) => self.simulate_401k(account, terms, profile, variance),
            AccountKind::Dividend(terms) => self.simulate_dividend(account, terms, profile, variance),
            AccountKind::Hysa(terms) => self.simulate_hysa(account, terms, profile, variance),
            AccountKind::Brokerage(terms) => self.simulate_brokerage(account, terms, profile, variance),
            AccountKind::Unsupported => Forecast::uncomputable(account),
        };

        log::debug!(
            "Account {} ({:?}) variance {:+}: {} rows, final balance {:.2}",
            account.id,
            forecast.account_type,
            variance,
            forecast.rows.len(),
            forecast.summary().final_balance,
        );
        Ok(forecast)
    }

    /// 401(k): salary-based or fixed contribution plus capped employer match
    pub fn simulate_401k(
        &self,
        account: &Account,
        terms: &Retirement401kTerms,
        profile: &Profile,
        variance: f64,
    ) -> Forecast {
        let growth_rate = monthly_rate(terms.rate_of_return, variance);

        self.project(account, profile, |state| {
            let contribution = if state.contributing {
                let employee = terms.employee_contribution(account.monthly_contribution, state.salary);
                employee + terms.employer_match(employee, state.salary)
            } else {
                0.0
            };
            MonthPlan::new(contribution, growth_rate)
        })
    }

    /// Dividend investing: price growth carries the variance, dividends
    /// compound only when reinvested
    pub fn simulate_dividend(
        &self,
        account: &Account,
        terms: &DividendTerms,
        profile: &Profile,
        variance: f64,
    ) -> Forecast {
        let growth_rate = monthly_rate(terms.underlying_asset_growth, variance);
        let monthly_yield = terms.expected_yield / 100.0 / 12.0;

        self.project(account, profile, |state| {
            let plan = MonthPlan::new(fixed_contribution(account, state), growth_rate);
            if terms.drip_enabled {
                plan.with_reinvested_yield(monthly_yield)
            } else {
                // Paid-out dividends leave the account untracked
                plan
            }
        })
    }

    /// High-yield savings compounding at the APY
    pub fn simulate_hysa(&self, account: &Account, terms: &HysaTerms, profile: &Profile, variance: f64) -> Forecast {
        let growth_rate = monthly_rate(terms.apy, variance);
        self.project(account, profile, |state| {
            MonthPlan::new(fixed_contribution(account, state), growth_rate)
        })
    }

    /// Brokerage compounding at the expected total return
    pub fn simulate_brokerage(
        &self,
        account: &Account,
        terms: &BrokerageTerms,
        profile: &Profile,
        variance: f64,
    ) -> Forecast {
        let growth_rate = monthly_rate(terms.expected_return_rate, variance);
        self.project(account, profile, |state| {
            MonthPlan::new(fixed_contribution(account, state), growth_rate)
        })
    }

    /// Run the yearly loop from year 0 through the profile-derived horizon
    ///
    /// Every year but the last folds twelve monthly steps; the last row
    /// reports the balance reached at the horizon.
    fn project<F>(&self, account: &Account, profile: &Profile, mut plan_for: F) -> Forecast
    where
        F: FnMut(&ProjectionState) -> MonthPlan,
    {
        let horizon = profile.horizon_years(self.config.post_retirement_years);
        let mut forecast = Forecast::new(account);
        forecast.rows.reserve(horizon as usize + 1);

        let mut state = ProjectionState::from_account(account, profile);

        for year in 0..=horizon {
            let opening = state.balance;
            let totals = if year < horizon {
                YearTotals::run_year(opening, &plan_for(&state))
            } else {
                YearTotals::opening(opening)
            };

            let row = ProjectionRow::from_totals(year, profile.age_at(year), opening, totals);
            log::trace!(
                "Account {} year {}: balance {:.2} contributions {:.2} interest {:.2}",
                account.id,
                year,
                row.balance,
                row.contributions,
                row.interest,
            );
            forecast.add_row(row);

            state.advance_year(totals.balance, profile);
        }

        forecast
    }
}

/// Fixed monthly contribution, stopped once retired
fn fixed_contribution(account: &Account, state: &ProjectionState) -> f64 {
    if state.contributing {
        account.monthly_contribution
    } else {
        0.0
    }
}

/// Forecast an account with the default config
pub fn forecast_for(account: &Account, profile: &Profile, variance: f64) -> Result<Forecast, ForecastError> {
    ForecastEngine::default().forecast_for(account, profile, variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountType, MAX_AGE};
    use approx::assert_relative_eq;

    fn test_profile() -> Profile {
        Profile::new(30, 65, 120_000.0, 3.0)
    }

    fn match_401k(monthly: f64) -> Account {
        Account::retirement_401k(
            "k1",
            50_000.0,
            monthly,
            Retirement401kTerms {
                rate_of_return: 7.0,
                has_company_match: true,
                match_percentage: 50.0,
                match_up_to_percentage: 6.0,
                contribution_percentage: None,
            },
        )
    }

    fn dividend(drip: bool) -> Account {
        Account::dividend(
            "d1",
            20_000.0,
            200.0,
            DividendTerms {
                expected_yield: 3.0,
                underlying_asset_growth: 5.0,
                drip_enabled: drip,
            },
        )
    }

    fn all_types() -> Vec<Account> {
        vec![
            match_401k(1_000.0),
            dividend(true),
            dividend(false),
            Account::hysa("h1", 15_000.0, 250.0, 4.5),
            Account::brokerage("b1", 8_000.0, 400.0, 8.0),
        ]
    }

    #[test]
    fn test_horizon_is_profile_derived() {
        let engine = ForecastEngine::default();
        let profile = test_profile();
        let account = Account::hysa("h1", 1_000.0, 100.0, 4.0).with_time_horizon(5.0);

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        // 35 working years + 20 retired, inclusive of year 0
        assert_eq!(forecast.rows.len(), 56);
        assert_eq!(forecast.rows[0].age, 30);
        assert_eq!(forecast.final_row().unwrap().age, 85);
        assert_eq!(forecast.account_type, Some(AccountType::Hysa));
    }

    #[test]
    fn test_zero_horizon_single_row() {
        let engine = ForecastEngine::new(ForecastConfig {
            post_retirement_years: 0,
            ..ForecastConfig::default()
        });
        let profile = Profile::new(65, 65, 0.0, 0.0);
        let account = Account::brokerage("b", 12_345.0, 500.0, 10.0);

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        assert_eq!(forecast.rows.len(), 1);
        let row = forecast.rows[0];
        assert_eq!(row.balance, 12_345.0);
        assert_eq!(row.contributions, 0.0);
        assert_eq!(row.interest, 0.0);
        assert_eq!(row.growth, 0.0);
    }

    #[test]
    fn test_retired_profile_still_projects_twenty_years() {
        let engine = ForecastEngine::default();
        let profile = Profile::new(60, 60, 80_000.0, 2.0);

        for account in all_types() {
            let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
            assert_eq!(forecast.rows.len(), 21, "account {}", account.id);
            assert!(forecast.rows.iter().all(|r| r.contributions == 0.0));
        }
    }

    #[test]
    fn test_contributions_stop_at_retirement() {
        let engine = ForecastEngine::default();
        let profile = Profile::new(60, 63, 100_000.0, 0.0);
        let account = Account::hysa("h1", 0.0, 100.0, 0.0);

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        for row in &forecast.rows {
            if row.age < 63 {
                assert_relative_eq!(row.contributions, 1_200.0, epsilon = 1e-9);
            } else {
                assert_eq!(row.contributions, 0.0, "age {}", row.age);
            }
        }
        assert_relative_eq!(forecast.final_row().unwrap().balance, 3_600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_matches_interest_every_row() {
        let engine = ForecastEngine::default();
        let profile = test_profile();

        for variance in [-2.0, 0.0, 2.0] {
            for account in all_types() {
                let forecast = engine.forecast_for(&account, &profile, variance).unwrap();
                for row in &forecast.rows {
                    let scale = row.balance.abs().max(1.0);
                    assert!(
                        (row.growth - row.interest).abs() / scale < 1e-6,
                        "account {} year {}: growth {} interest {}",
                        account.id,
                        row.year,
                        row.growth,
                        row.interest
                    );
                }
            }
        }
    }

    #[test]
    fn test_balance_never_decreases_with_nonnegative_inputs() {
        let engine = ForecastEngine::default();
        let profile = test_profile();

        for account in all_types() {
            let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
            let mut previous = account.current_balance;
            for row in &forecast.rows {
                assert!(row.balance >= previous, "account {} year {}", account.id, row.year);
                previous = row.balance;
            }
        }
    }

    #[test]
    fn test_employer_match_capped_in_projection() {
        let engine = ForecastEngine::default();
        // No salary growth so every working year sees the same cap
        let profile = Profile::new(30, 65, 120_000.0, 0.0);

        for monthly in [600.0, 1_500.0, 4_000.0] {
            let forecast = engine.forecast_for(&match_401k(monthly), &profile, 0.0).unwrap();
            // Employee share plus a 300/month match
            assert_relative_eq!(forecast.rows[0].contributions, (monthly + 300.0) * 12.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_percentage_contribution_follows_salary_growth() {
        let engine = ForecastEngine::default();
        let profile = Profile::new(30, 65, 120_000.0, 5.0);
        let account = Account::retirement_401k(
            "k2",
            0.0,
            0.0,
            Retirement401kTerms {
                rate_of_return: 0.0,
                has_company_match: false,
                match_percentage: 0.0,
                match_up_to_percentage: 0.0,
                contribution_percentage: Some(10.0),
            },
        );

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        assert_relative_eq!(forecast.rows[0].contributions, 12_000.0, epsilon = 1e-6);
        assert_relative_eq!(forecast.rows[1].contributions, 12_600.0, epsilon = 1e-6);
    }

    #[test]
    fn test_drip_beats_paid_out_dividends() {
        let engine = ForecastEngine::default();
        let profile = test_profile();

        let drip = engine.forecast_for(&dividend(true), &profile, 0.0).unwrap();
        let paid = engine.forecast_for(&dividend(false), &profile, 0.0).unwrap();

        for year in 1..drip.rows.len() {
            assert!(drip.rows[year].balance > paid.rows[year].balance, "year {}", year);
        }
        // Paid-out dividends do not show up as interest
        assert!(drip.rows[0].interest > paid.rows[0].interest);
    }

    #[test]
    fn test_variance_shifts_growth_rate_only() {
        let engine = ForecastEngine::default();
        let profile = test_profile();
        let account = Account::hysa("h1", 10_000.0, 0.0, 4.0);

        let high = engine.forecast_for(&account, &profile, 2.0).unwrap();
        let same = engine.forecast_for(&Account::hysa("h1", 10_000.0, 0.0, 6.0), &profile, 0.0).unwrap();
        assert_eq!(high.rows, same.rows);
    }

    #[test]
    fn test_hysa_first_year_matches_monthly_compounding() {
        let engine = ForecastEngine::default();
        let profile = test_profile();
        let account = Account::hysa("h1", 10_000.0, 0.0, 6.0);

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        let expected = 10_000.0 * (1.0 + 0.005_f64).powi(12);
        assert_relative_eq!(forecast.rows[0].balance, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_unsupported_type_is_empty_not_error() {
        let engine = ForecastEngine::default();
        let account = Account::new("x1", 1_000.0, 0.0, AccountKind::Unsupported);

        let forecast = engine.forecast_for(&account, &test_profile(), 0.0).unwrap();
        assert!(!forecast.is_computable());
        assert_eq!(forecast.account_type, None);
    }

    #[test]
    fn test_nan_inputs_fail_fast() {
        let engine = ForecastEngine::default();

        let account = Account::brokerage("b1", f64::NAN, 100.0, 7.0);
        match engine.forecast_for(&account, &test_profile(), 0.0) {
            Err(ForecastError::InvalidAccount(err)) => assert_eq!(err.field, "currentBalance"),
            other => panic!("expected invalid account, got {:?}", other),
        }

        let profile = Profile::new(30, 65, 100_000.0, f64::INFINITY);
        let account = Account::brokerage("b1", 1_000.0, 100.0, 7.0);
        assert!(matches!(
            engine.forecast_for(&account, &profile, 0.0),
            Err(ForecastError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unsupported_type_skips_numeric_checks() {
        let engine = ForecastEngine::default();
        let account = Account::new("x1", f64::NAN, f64::INFINITY, AccountKind::Unsupported);
        let profile = Profile::new(30, u32::MAX, f64::NAN, 3.0);

        let forecast = engine.forecast_for(&account, &profile, 0.0).unwrap();
        assert!(!forecast.is_computable());
    }

    #[test]
    fn test_unbounded_retirement_age_rejected() {
        let engine = ForecastEngine::default();
        let account = Account::hysa("h", 1.0, 0.0, 1.0);
        let profile = Profile::new(30, u32::MAX - 5, 100_000.0, 3.0);

        match engine.forecast_for(&account, &profile, 0.0) {
            Err(ForecastError::InvalidProfile(err)) => assert_eq!(err.field, "retirementAge"),
            other => panic!("expected invalid profile, got {:?}", other),
        }

        // Oldest accepted ages still project a bounded number of rows
        let oldest = Profile::new(MAX_AGE, MAX_AGE, 0.0, 0.0);
        let forecast = engine.forecast_for(&account, &oldest, 0.0).unwrap();
        assert_eq!(forecast.rows.len(), DEFAULT_POST_RETIREMENT_YEARS as usize + 1);
    }

    #[test]
    fn test_out_of_range_config_rejected() {
        let account = Account::hysa("h", 1.0, 0.0, 1.0);
        let profile = test_profile();

        let engine = ForecastEngine::new(ForecastConfig {
            post_retirement_years: u32::MAX,
            ..ForecastConfig::default()
        });
        assert!(matches!(
            engine.forecast_for(&account, &profile, 0.0),
            Err(ForecastError::InvalidConfig { field: "postRetirementYears", .. })
        ));

        let engine = ForecastEngine::default();
        assert!(matches!(
            engine.forecast_for(&account, &profile, f64::NAN),
            Err(ForecastError::InvalidConfig { field: "variance", .. })
        ));
    }

    #[test]
    fn test_rows_are_finite() {
        let engine = ForecastEngine::default();
        for account in all_types() {
            let forecast = engine.forecast_for(&account, &test_profile(), 2.0).unwrap();
            assert!(forecast.rows.iter().all(ProjectionRow::is_finite));
        }
    }
}
