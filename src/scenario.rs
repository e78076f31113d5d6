//! Variance scenarios: base, optimistic and pessimistic runs
//!
//! Each scenario is an independent run of the engine with the annual return
//! shifted by the configured offset. The three runs share nothing, so they
//! are executed in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::accounts::{Account, Profile};
use crate::error::ForecastError;
use crate::projection::{AggregatedForecast, Forecast, ForecastConfig, ForecastEngine};

/// Results for the base, high (+offset) and low (-offset) scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceBands<T> {
    pub base: T,
    pub high: T,
    pub low: T,
}

impl<T> VarianceBands<T> {
    /// Apply the same function to every scenario
    pub fn map<'a, U, F: Fn(&'a T) -> U>(&'a self, f: F) -> VarianceBands<U> {
        VarianceBands {
            base: f(&self.base),
            high: f(&self.high),
            low: f(&self.low),
        }
    }
}

/// Scenario runner holding one engine configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let bands = runner.with_variance(&account, &profile)?;
/// println!("{:.2}", bands.high.summary().final_balance);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ForecastEngine,
}

impl ScenarioRunner {
    /// Create runner with the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a specific config
    pub fn with_config(config: ForecastConfig) -> Self {
        Self {
            engine: ForecastEngine::new(config),
        }
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Run the three scenarios for one account
    pub fn with_variance(&self, account: &Account, profile: &Profile) -> Result<VarianceBands<Forecast>, ForecastError> {
        self.run_bands(|variance| self.engine.forecast_for(account, profile, variance))
    }

    /// Run the three scenarios for the whole portfolio
    pub fn aggregate_with_variance(
        &self,
        accounts: &[Account],
        profile: &Profile,
    ) -> Result<VarianceBands<AggregatedForecast>, ForecastError> {
        self.run_bands(|variance| self.engine.aggregate(accounts, profile, variance))
    }

    /// Run the three scenarios for each account separately
    pub fn run_batch(
        &self,
        accounts: &[Account],
        profile: &Profile,
    ) -> Result<Vec<VarianceBands<Forecast>>, ForecastError> {
        accounts
            .par_iter()
            .map(|account| self.with_variance(account, profile))
            .collect()
    }

    fn run_bands<T, F>(&self, run: F) -> Result<VarianceBands<T>, ForecastError>
    where
        T: Send,
        F: Fn(f64) -> Result<T, ForecastError> + Sync,
    {
        let offset = self.engine.config().variance_offset;
        let (base, (high, low)) = rayon::join(|| run(0.0), || rayon::join(|| run(offset), || run(-offset)));

        Ok(VarianceBands {
            base: base?,
            high: high?,
            low: low?,
        })
    }
}

/// Base/high/low forecasts for one account with the default config
pub fn with_variance(account: &Account, profile: &Profile) -> Result<VarianceBands<Forecast>, ForecastError> {
    ScenarioRunner::new().with_variance(account, profile)
}

/// Base/high/low portfolio forecasts with the default config
pub fn aggregate_with_variance(
    accounts: &[Account],
    profile: &Profile,
) -> Result<VarianceBands<AggregatedForecast>, ForecastError> {
    ScenarioRunner::new().aggregate_with_variance(accounts, profile)
}
