//! Export base/high/low forecast bands for a stored portfolio
//!
//! Writes one long-format CSV: the portfolio total and every account,
//! each with its three scenarios, one row per projected year.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use portfolio_forecast::{
    accounts::{load_portfolio, loader::DEFAULT_PORTFOLIO_PATH},
    projection::DEFAULT_VARIANCE_OFFSET,
    ForecastConfig, ProjectionRow, ScenarioRunner, VarianceBands,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "export_bands")]
#[command(about = "Export portfolio and per-account variance bands to CSV")]
struct Args {
    /// JSON portfolio holding the profile and accounts
    #[arg(long, default_value = DEFAULT_PORTFOLIO_PATH)]
    portfolio: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "forecast_bands.csv")]
    output: PathBuf,

    /// Percentage points added/removed for the high/low scenarios
    #[arg(long, default_value_t = DEFAULT_VARIANCE_OFFSET)]
    variance: f64,
}

#[derive(Debug, Serialize)]
struct BandRecord<'a> {
    scope: &'a str,
    account_type: &'a str,
    scenario: &'a str,
    calendar_year: i32,
    year: u32,
    age: u32,
    balance: f64,
    contributions: f64,
    interest: f64,
    growth: f64,
}

fn write_bands<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    scope: &str,
    account_type: &str,
    bands: &VarianceBands<&[ProjectionRow]>,
    this_year: i32,
) -> Result<usize> {
    let mut written = 0;
    for (scenario, rows) in [("base", bands.base), ("high", bands.high), ("low", bands.low)] {
        for row in rows {
            writer.serialize(BandRecord {
                scope,
                account_type,
                scenario,
                calendar_year: this_year + row.year as i32,
                year: row.year,
                age: row.age,
                balance: row.balance,
                contributions: row.contributions,
                interest: row.interest,
                growth: row.growth,
            })?;
            written += 1;
        }
    }
    Ok(written)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    println!("Loading portfolio from {}...", args.portfolio.display());
    let portfolio = load_portfolio(&args.portfolio)
        .map_err(|e| anyhow!("Failed to load portfolio from {}: {}", args.portfolio.display(), e))?;
    println!("Loaded {} accounts", portfolio.accounts.len());

    let runner = ScenarioRunner::with_config(ForecastConfig {
        variance_offset: args.variance,
        ..ForecastConfig::default()
    });

    // Portfolio bands and per-account bands are independent
    let (portfolio_bands, account_bands) = rayon::join(
        || runner.aggregate_with_variance(&portfolio.accounts, &portfolio.profile),
        || runner.run_batch(&portfolio.accounts, &portfolio.profile),
    );
    let portfolio_bands = portfolio_bands?;
    let account_bands = account_bands?;
    println!("Forecasts completed in {:?}", start.elapsed());

    let this_year = Utc::now().year();
    let mut writer = csv::Writer::from_path(&args.output)?;

    let mut written = write_bands(
        &mut writer,
        "portfolio",
        "",
        &portfolio_bands.map(|f| f.rows.as_slice()),
        this_year,
    )?;

    for bands in &account_bands {
        let Some(account_type) = bands.base.account_type else {
            log::warn!("Skipping account {}: unsupported type", bands.base.account_id);
            continue;
        };
        written += write_bands(
            &mut writer,
            &bands.base.account_id,
            account_type.as_str(),
            &bands.map(|f| f.rows.as_slice()),
            this_year,
        )?;
    }
    writer.flush()?;

    println!("Wrote {} rows to {}", written, args.output.display());

    let finals = portfolio_bands.map(|f| f.summary().final_balance);
    println!("\nPortfolio final balance:");
    println!("  Base: ${:.2}", finals.base);
    println!("  High: ${:.2}", finals.high);
    println!("  Low:  ${:.2}", finals.low);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
