//! Portfolio Forecast CLI
//!
//! Command-line interface for running account and portfolio forecasts

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use portfolio_forecast::{
    accounts::{load_accounts_csv, load_portfolio, loader::DEFAULT_PORTFOLIO_PATH, Portfolio},
    projection::{DEFAULT_POST_RETIREMENT_YEARS, DEFAULT_VARIANCE_OFFSET},
    Account, AccountKind, Assumptions, ForecastConfig, Profile, ProjectionRow, ScenarioRunner, VarianceBands,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "portfolio_forecast")]
#[command(about = "Year-by-year savings forecasts with base, high and low scenarios")]
struct Cli {
    /// JSON portfolio holding the profile and accounts
    #[arg(long, conflicts_with = "accounts")]
    portfolio: Option<PathBuf>,

    /// Flat accounts CSV; the profile then comes from the flags below
    #[arg(long, requires_all = ["current_age", "retirement_age", "salary"])]
    accounts: Option<PathBuf>,

    #[arg(long)]
    current_age: Option<u32>,

    #[arg(long)]
    retirement_age: Option<u32>,

    /// Current annual salary
    #[arg(long)]
    salary: Option<f64>,

    /// Annual salary growth in percent
    #[arg(long, default_value_t = 0.0)]
    salary_growth: f64,

    /// Forecast a single account instead of the whole portfolio
    #[arg(long)]
    account: Option<String>,

    /// Write the forecast rows to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Years to keep projecting after retirement
    #[arg(long, default_value_t = DEFAULT_POST_RETIREMENT_YEARS)]
    post_retirement_years: u32,

    /// Percentage points added/removed for the high/low scenarios
    #[arg(long, default_value_t = DEFAULT_VARIANCE_OFFSET)]
    variance: f64,

    /// Rows to print to the console (0 = all)
    #[arg(long, default_value_t = 0)]
    rows: usize,
}

/// One output line: base row plus the high/low balances for the same year
#[derive(Debug, Serialize)]
struct OutputRow {
    calendar_year: i32,
    year: u32,
    age: u32,
    balance: f64,
    high_balance: f64,
    low_balance: f64,
    contributions: f64,
    interest: f64,
    growth: f64,
}

fn load_inputs(cli: &Cli) -> Result<Portfolio> {
    if let Some(path) = &cli.accounts {
        let accounts = load_accounts_csv(path)
            .map_err(|e| anyhow!("Failed to load accounts from {}: {}", path.display(), e))?;

        // clap enforces these are present together with --accounts
        let (Some(current_age), Some(retirement_age), Some(salary)) =
            (cli.current_age, cli.retirement_age, cli.salary)
        else {
            bail!("--accounts needs --current-age, --retirement-age and --salary");
        };
        let profile = Profile::new(current_age, retirement_age, salary, cli.salary_growth);
        profile.validate()?;

        return Ok(Portfolio { profile, accounts });
    }

    let path = cli.portfolio.as_deref().unwrap_or(Path::new(DEFAULT_PORTFOLIO_PATH));
    load_portfolio(path).map_err(|e| anyhow!("Failed to load portfolio from {}: {}", path.display(), e))
}

fn output_rows(bands: &VarianceBands<Vec<ProjectionRow>>) -> Vec<OutputRow> {
    let this_year = Utc::now().year();
    bands
        .base
        .iter()
        .zip(&bands.high)
        .zip(&bands.low)
        .map(|((base, high), low)| OutputRow {
            calendar_year: this_year + base.year as i32,
            year: base.year,
            age: base.age,
            balance: base.balance,
            high_balance: high.balance,
            low_balance: low.balance,
            contributions: base.contributions,
            interest: base.interest,
            growth: base.growth,
        })
        .collect()
}

fn print_rows(rows: &[OutputRow], limit: usize) {
    println!(
        "{:>6} {:>4} {:>16} {:>16} {:>16} {:>14} {:>14}",
        "Year", "Age", "Balance", "High", "Low", "Contrib", "Interest"
    );
    println!("{}", "-".repeat(92));

    let shown = if limit == 0 { rows.len() } else { limit.min(rows.len()) };
    for row in &rows[..shown] {
        println!(
            "{:>6} {:>4} {:>16.2} {:>16.2} {:>16.2} {:>14.2} {:>14.2}",
            row.calendar_year, row.age, row.balance, row.high_balance, row.low_balance, row.contributions, row.interest,
        );
    }
    if shown < rows.len() {
        println!("... ({} more years)", rows.len() - shown);
    }
}

fn write_csv(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Warn about 401(k) accounts whose employee contribution exceeds the limit
fn check_contribution_limits(accounts: &[Account], profile: &Profile, assumptions: &Assumptions) {
    for account in accounts {
        let AccountKind::Retirement401k(terms) = &account.kind else {
            continue;
        };
        let monthly = terms.employee_contribution(account.monthly_contribution, profile.current_salary);
        let horizon = account
            .time_horizon
            .unwrap_or(profile.years_to_retirement() as f64);

        let check = assumptions.limits.check(monthly, profile.current_age, horizon);
        if !check.is_valid {
            println!(
                "Warning: {} contributes ${:.2}/yr, ${:.2} over the ${:.0} limit",
                account.display_name(),
                check.annual_contribution,
                check.exceeds_by,
                check.limit
            );
        }
        if !assumptions.is_suggested_401k_return(terms.rate_of_return) {
            log::info!(
                "{}: return {:.2}% outside the suggested {:.0}-{:.0}% range",
                account.display_name(),
                terms.rate_of_return,
                assumptions.suggested_401k_range.0,
                assumptions.suggested_401k_range.1
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let portfolio = load_inputs(&cli)?;
    let profile = &portfolio.profile;

    println!("Portfolio Forecast v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!("Profile:");
    println!("  Age: {} (retiring at {})", profile.current_age, profile.retirement_age);
    println!("  Salary: ${:.2} (+{:.2}%/yr)", profile.current_salary, profile.salary_growth_rate);
    println!("  Accounts: {}", portfolio.accounts.len());
    println!();

    let assumptions = Assumptions::from_csv().unwrap_or_else(|e| {
        log::warn!("Using built-in contribution limits: {}", e);
        Assumptions::default()
    });
    check_contribution_limits(&portfolio.accounts, profile, &assumptions);

    let runner = ScenarioRunner::with_config(ForecastConfig {
        post_retirement_years: cli.post_retirement_years,
        variance_offset: cli.variance,
    });

    let (title, bands) = match &cli.account {
        Some(id) => {
            let account = portfolio
                .account(id)
                .ok_or_else(|| anyhow!("No account with id {}", id))?;
            let bands = runner.with_variance(account, profile)?;
            if !bands.base.is_computable() {
                bail!("Account {} has an unsupported type and cannot be forecast", id);
            }
            (account.display_name().to_string(), bands.map(|f| f.rows.clone()))
        }
        None => {
            let bands = runner.aggregate_with_variance(&portfolio.accounts, profile)?;
            let title = format!("Portfolio ({} accounts)", bands.base.account_count);
            (title, bands.map(|f| f.rows.clone()))
        }
    };

    let rows = output_rows(&bands);
    if rows.is_empty() {
        println!("No forecastable accounts.");
        return Ok(());
    }

    println!("{} - variance +/-{:.1} points:", title, cli.variance);
    print_rows(&rows, cli.rows);

    if let Some(path) = &cli.output {
        write_csv(path, &rows)?;
        println!("\nFull results written to: {}", path.display());
    }

    // Summary
    let retirement_year = profile.years_to_retirement();
    println!("\nSummary:");
    println!("  Years projected: {}", rows.len());
    if let Some(at_retirement) = rows.iter().find(|r| r.year == retirement_year) {
        println!(
            "  At retirement:   ${:.2} (high ${:.2}, low ${:.2})",
            at_retirement.balance, at_retirement.high_balance, at_retirement.low_balance
        );
    }
    if let Some(last) = rows.last() {
        println!(
            "  Final balance:   ${:.2} (high ${:.2}, low ${:.2})",
            last.balance, last.high_balance, last.low_balance
        );
    }
    println!("  Total contributions: ${:.2}", rows.iter().map(|r| r.contributions).sum::<f64>());
    println!("  Total interest:      ${:.2}", rows.iter().map(|r| r.interest).sum::<f64>());

    Ok(())
}
