//! Forecast engine for single accounts and whole portfolios

mod aggregate;
mod engine;
mod rows;
mod state;

pub use aggregate::{aggregate, sum_forecasts};
pub use engine::{
    forecast_for, ForecastConfig, ForecastEngine, DEFAULT_POST_RETIREMENT_YEARS,
    DEFAULT_VARIANCE_OFFSET, MAX_POST_RETIREMENT_YEARS,
};
pub use rows::{AggregatedForecast, Forecast, ForecastSummary, ProjectionRow};
pub use state::{MonthPlan, ProjectionState, YearTotals, MONTHS_PER_YEAR};
