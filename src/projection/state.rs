//! Projection state tracking for a single account

use crate::accounts::{Account, Profile};

/// Number of compounding steps per projected year
pub const MONTHS_PER_YEAR: u32 = 12;

/// Monthly amounts that hold for every month of one simulated year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthPlan {
    /// Amount added each month before growth (employer match included)
    pub contribution: f64,

    /// Monthly growth rate as a decimal
    pub growth_rate: f64,

    /// Monthly reinvested yield as a decimal, applied after growth
    pub reinvested_yield: Option<f64>,
}

impl MonthPlan {
    pub fn new(contribution: f64, growth_rate: f64) -> Self {
        Self {
            contribution,
            growth_rate,
            reinvested_yield: None,
        }
    }

    pub fn with_reinvested_yield(mut self, monthly_yield: f64) -> Self {
        self.reinvested_yield = Some(monthly_yield);
        self
    }
}

/// Running totals inside one simulated year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearTotals {
    pub balance: f64,
    pub contributions: f64,
    pub interest: f64,
}

impl YearTotals {
    /// Totals at the start of a year, before any monthly step
    pub fn opening(balance: f64) -> Self {
        Self {
            balance,
            contributions: 0.0,
            interest: 0.0,
        }
    }

    /// Apply one month: contribute, grow, then reinvest yield if any
    pub fn step(self, plan: &MonthPlan) -> Self {
        let mut balance = self.balance + plan.contribution;
        let contributions = self.contributions + plan.contribution;

        let growth_interest = balance * plan.growth_rate;
        let mut interest = self.interest + growth_interest;
        balance *= 1.0 + plan.growth_rate;

        if let Some(monthly_yield) = plan.reinvested_yield {
            let yield_interest = balance * monthly_yield;
            interest += yield_interest;
            balance *= 1.0 + monthly_yield;
        }

        Self {
            balance,
            contributions,
            interest,
        }
    }

    /// Fold a full year of monthly steps starting from `opening_balance`
    pub fn run_year(opening_balance: f64, plan: &MonthPlan) -> Self {
        (0..MONTHS_PER_YEAR).fold(Self::opening(opening_balance), |totals, _| totals.step(plan))
    }
}

/// State of an account between projected years
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Year being simulated (0 = current year)
    pub year: u32,

    /// Balance at the start of `year`
    pub balance: f64,

    /// Annual salary during `year`
    pub salary: f64,

    /// Whether contributions are made during `year`
    pub contributing: bool,
}

impl ProjectionState {
    /// Initialize state from an account at projection start
    pub fn from_account(account: &Account, profile: &Profile) -> Self {
        Self {
            year: 0,
            balance: account.current_balance,
            salary: profile.current_salary,
            contributing: !profile.is_retired_in(0),
        }
    }

    /// Advance to next year after closing the current one at `closing_balance`
    pub fn advance_year(&mut self, closing_balance: f64, profile: &Profile) {
        // Salary only grows while still working
        if self.contributing {
            self.salary *= 1.0 + profile.salary_growth_rate / 100.0;
        }
        self.year += 1;
        self.balance = closing_balance;
        self.contributing = !profile.is_retired_in(self.year);
    }
}
