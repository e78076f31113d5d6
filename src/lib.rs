//! Portfolio Forecast - deterministic projections for personal savings accounts
//!
//! This library provides:
//! - Year-by-year forecasts for 401(k), dividend, HYSA and brokerage accounts
//! - Portfolio aggregation across accounts
//! - Base/high/low variance scenarios
//! - 401(k) contribution limit checks
//! - Loaders for stored profiles and accounts

pub mod accounts;
pub mod assumptions;
pub mod error;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use accounts::{Account, AccountKind, AccountType, Portfolio, Profile};
pub use assumptions::{validate_contribution, Assumptions, ContributionCheck, ContributionLimits};
pub use error::ForecastError;
pub use projection::{AggregatedForecast, Forecast, ForecastConfig, ForecastEngine, ProjectionRow};
pub use scenario::{ScenarioRunner, VarianceBands};
