//! AWS Lambda handler for running portfolio forecasts
//!
//! Accepts a profile and its accounts as JSON and returns base/high/low
//! forecasts for the whole portfolio, or for one account when `accountId`
//! is given.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use portfolio_forecast::{
    accounts::Portfolio,
    projection::{ForecastSummary, DEFAULT_POST_RETIREMENT_YEARS, DEFAULT_VARIANCE_OFFSET},
    Account, AccountKind, AggregatedForecast, Assumptions, ContributionCheck, Forecast, ForecastConfig, Profile,
    ScenarioRunner, VarianceBands,
};
use serde::{Deserialize, Serialize};

/// Input for one forecast request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub profile: Profile,

    #[serde(default)]
    pub accounts: Vec<Account>,

    /// Forecast only this account
    #[serde(default)]
    pub account_id: Option<String>,

    /// Scenario offset in percentage points (default: 2)
    #[serde(default = "default_variance_offset")]
    pub variance_offset: f64,

    /// Years projected past retirement (default: 20)
    #[serde(default = "default_post_retirement_years")]
    pub post_retirement_years: u32,
}

fn default_variance_offset() -> f64 { DEFAULT_VARIANCE_OFFSET }
fn default_post_retirement_years() -> u32 { DEFAULT_POST_RETIREMENT_YEARS }

/// Output from the forecast
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<VarianceBands<AggregatedForecast>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<VarianceBands<Forecast>>,
    pub summary: VarianceBands<ForecastSummary>,
    pub contribution_checks: Vec<AccountLimitCheck>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLimitCheck {
    pub account_id: String,
    #[serde(flatten)]
    pub check: ContributionCheck,
}

fn limit_checks(accounts: &[Account], profile: &Profile) -> Vec<AccountLimitCheck> {
    let limits = Assumptions::default().limits;
    accounts
        .iter()
        .filter_map(|account| match &account.kind {
            AccountKind::Retirement401k(terms) => {
                let monthly = terms.employee_contribution(account.monthly_contribution, profile.current_salary);
                let horizon = account
                    .time_horizon
                    .unwrap_or(profile.years_to_retirement() as f64);
                Some(AccountLimitCheck {
                    account_id: account.id.clone(),
                    check: limits.check(monthly, profile.current_age, horizon),
                })
            }
            _ => None,
        })
        .collect()
}

async fn handler(event: LambdaEvent<ForecastRequest>) -> Result<ForecastResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let portfolio = Portfolio {
        profile: request.profile,
        accounts: request.accounts,
    };
    portfolio.validate().map_err(|e| Error::from(e.to_string()))?;

    log::info!(
        "Forecast request: {} accounts, account filter {:?}",
        portfolio.accounts.len(),
        request.account_id
    );

    let runner = ScenarioRunner::with_config(ForecastConfig {
        post_retirement_years: request.post_retirement_years,
        variance_offset: request.variance_offset,
    });

    let (portfolio_bands, account_bands, summary) = match &request.account_id {
        Some(id) => {
            let account = portfolio
                .account(id)
                .ok_or_else(|| Error::from(format!("No account with id {}", id)))?;
            let bands = runner.with_variance(account, &portfolio.profile)?;
            let summary = bands.map(Forecast::summary);
            (None, Some(bands), summary)
        }
        None => {
            let bands = runner.aggregate_with_variance(&portfolio.accounts, &portfolio.profile)?;
            let summary = bands.map(AggregatedForecast::summary);
            (Some(bands), None, summary)
        }
    };

    Ok(ForecastResponse {
        portfolio: portfolio_bands,
        account: account_bands,
        summary,
        contribution_checks: limit_checks(&portfolio.accounts, &portfolio.profile),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
