//! Portfolio aggregation: sum per-account forecasts year by year

use rayon::prelude::*;

use super::engine::ForecastEngine;
use super::rows::{AggregatedForecast, Forecast, ProjectionRow};
use crate::accounts::{Account, Profile};
use crate::error::ForecastError;

impl ForecastEngine {
    /// Forecast every account at the same variance and sum them per year
    ///
    /// Accounts are projected in parallel; the summation runs in input order
    /// so results do not depend on scheduling.
    pub fn aggregate(
        &self,
        accounts: &[Account],
        profile: &Profile,
        variance: f64,
    ) -> Result<AggregatedForecast, ForecastError> {
        if accounts.is_empty() {
            return Ok(AggregatedForecast::empty());
        }

        let forecasts: Vec<Forecast> = accounts
            .par_iter()
            .map(|account| self.forecast_for(account, profile, variance))
            .collect::<Result<_, _>>()?;

        Ok(sum_forecasts(&forecasts, profile))
    }
}

/// Sum forecasts year by year
///
/// A forecast shorter than the longest one simply stops contributing to the
/// later years. Ages come from the profile.
pub fn sum_forecasts(forecasts: &[Forecast], profile: &Profile) -> AggregatedForecast {
    let year_count = forecasts.iter().map(|f| f.rows.len()).max().unwrap_or(0);
    let computable: Vec<&Forecast> = forecasts.iter().filter(|f| f.is_computable()).collect();

    let rows = (0..year_count as u32)
        .map(|year| {
            let mut total = ProjectionRow::new(year, profile.age_at(year));
            for forecast in &computable {
                if let Some(row) = forecast.row(year) {
                    total.accumulate(row);
                }
            }
            total
        })
        .collect();

    AggregatedForecast {
        account_count: computable.len(),
        opening_balance: computable.iter().map(|f| f.opening_balance).sum(),
        rows,
    }
}

/// Aggregate accounts with the default config
pub fn aggregate(accounts: &[Account], profile: &Profile, variance: f64) -> Result<AggregatedForecast, ForecastError> {
    ForecastEngine::default().aggregate(accounts, profile, variance)
}
