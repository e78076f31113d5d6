//! Forecast output structures

use serde::{Deserialize, Serialize};

use super::state::YearTotals;
use crate::accounts::{Account, AccountType};

/// One projected year for one account (or for the whole portfolio)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    /// Years from today (0 = the current year)
    pub year: u32,

    /// Attained age in that year
    pub age: u32,

    /// Ending balance
    pub balance: f64,

    /// Contributions made during the year, employer match included
    pub contributions: f64,

    /// Compounding accrued during the year (returns plus reinvested dividends)
    pub interest: f64,

    /// balance - opening balance - contributions
    pub growth: f64,

    /// Same as `balance`
    pub total: f64,
}

impl ProjectionRow {
    /// Create an empty row for a year
    pub fn new(year: u32, age: u32) -> Self {
        Self {
            year,
            age,
            balance: 0.0,
            contributions: 0.0,
            interest: 0.0,
            growth: 0.0,
            total: 0.0,
        }
    }

    /// Close out a simulated year that opened at `opening_balance`
    pub fn from_totals(year: u32, age: u32, opening_balance: f64, totals: YearTotals) -> Self {
        Self {
            year,
            age,
            balance: totals.balance,
            contributions: totals.contributions,
            interest: totals.interest,
            growth: totals.balance - opening_balance - totals.contributions,
            total: totals.balance,
        }
    }

    /// Add another row's amounts into this one
    pub fn accumulate(&mut self, other: &ProjectionRow) {
        self.balance += other.balance;
        self.contributions += other.contributions;
        self.growth += other.growth;
        self.interest += other.interest;
        self.total = self.balance;
    }

    pub fn is_finite(&self) -> bool {
        self.balance.is_finite()
            && self.contributions.is_finite()
            && self.interest.is_finite()
            && self.growth.is_finite()
    }
}

/// Year-by-year projection for a single account
///
/// An empty `rows` list means the account could not be projected (for
/// example an unsupported account type); it is not a zero balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Account identifier
    pub account_id: String,

    /// Account type, `None` when unsupported
    pub account_type: Option<AccountType>,

    /// Balance the projection started from
    pub opening_balance: f64,

    /// Yearly rows, index 0 = current year
    pub rows: Vec<ProjectionRow>,
}

impl Forecast {
    pub fn new(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            account_type: account.account_type(),
            opening_balance: account.current_balance,
            rows: Vec::new(),
        }
    }

    /// Forecast for an account no simulator can handle
    pub fn uncomputable(account: &Account) -> Self {
        Self {
            opening_balance: 0.0,
            ..Self::new(account)
        }
    }

    /// Add a yearly row
    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn is_computable(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Row for a year offset, if projected that far
    pub fn row(&self, year: u32) -> Option<&ProjectionRow> {
        self.rows.get(year as usize)
    }

    pub fn final_row(&self) -> Option<&ProjectionRow> {
        self.rows.last()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ForecastSummary {
        ForecastSummary::from_rows(&self.rows)
    }
}

/// Year-by-year projection summed across accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedForecast {
    /// Number of accounts that contributed rows
    pub account_count: usize,

    /// Sum of opening balances of those accounts
    pub opening_balance: f64,

    /// Yearly portfolio rows, index 0 = current year
    pub rows: Vec<ProjectionRow>,
}

impl AggregatedForecast {
    pub fn empty() -> Self {
        Self {
            account_count: 0,
            opening_balance: 0.0,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, year: u32) -> Option<&ProjectionRow> {
        self.rows.get(year as usize)
    }

    pub fn final_row(&self) -> Option<&ProjectionRow> {
        self.rows.last()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ForecastSummary {
        ForecastSummary::from_rows(&self.rows)
    }
}

/// Summary statistics for a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub total_years: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub total_growth: f64,
}

impl ForecastSummary {
    fn from_rows(rows: &[ProjectionRow]) -> Self {
        Self {
            total_years: rows.len() as u32,
            final_balance: rows.last().map(|r| r.balance).unwrap_or(0.0),
            total_contributions: rows.iter().map(|r| r.contributions).sum(),
            total_interest: rows.iter().map(|r| r.interest).sum(),
            total_growth: rows.iter().map(|r| r.growth).sum(),
        }
    }
}
