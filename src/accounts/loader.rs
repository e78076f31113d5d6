//! Load profiles and accounts from stored portfolio files
//!
//! Two formats are supported: a JSON document holding the profile and the
//! account list, and the flat accounts table (one column per field, unused
//! columns left empty).

use super::data::parse_flag_text;
use super::{
    Account, AccountKind, AccountType, BrokerageTerms, DividendTerms, HysaTerms, Profile,
    Retirement401kTerms,
};
use chrono::{DateTime, Utc};
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default location of the stored portfolio
pub const DEFAULT_PORTFOLIO_PATH: &str = "data/portfolio.json";

/// Profile plus accounts, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub profile: Profile,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Portfolio {
    /// Apply save-time checks to every record and reject duplicate ids
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        self.profile.validate()?;
        check_accounts(&self.accounts)
    }

    /// Look up an account by id
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

fn check_accounts(accounts: &[Account]) -> Result<(), Box<dyn Error>> {
    let mut seen = HashSet::new();
    for account in accounts {
        if !seen.insert(account.id.as_str()) {
            return Err(format!("Duplicate account id: {}", account.id).into());
        }
        account.validate()?;
    }
    Ok(())
}

/// Raw CSV row matching the flat accounts table
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    id: String,
    #[serde(rename = "type")]
    account_type: String,
    nickname: Option<String>,
    current_balance: f64,
    monthly_contribution: Option<f64>,
    contribution_percentage: Option<f64>,
    time_horizon: Option<f64>,
    rate_of_return: Option<f64>,
    has_company_match: Option<String>,
    match_percentage: Option<f64>,
    match_up_to_percentage: Option<f64>,
    expected_yield: Option<f64>,
    underlying_asset_growth: Option<f64>,
    drip_enabled: Option<String>,
    expected_return_rate: Option<f64>,
    apy: Option<f64>,
    created_at: Option<i64>,
}

/// Stored booleans are either `0`/`1` or `true`/`false`
fn parse_flag(column: &str, raw: Option<&str>) -> Result<bool, Box<dyn Error>> {
    let raw = raw.unwrap_or("");
    parse_flag_text(raw).ok_or_else(|| format!("Invalid {}: {}", column, raw.trim()).into())
}

fn required(id: &str, column: &str, value: Option<f64>) -> Result<f64, Box<dyn Error>> {
    value.ok_or_else(|| format!("Account {}: missing {}", id, column).into())
}

impl CsvRow {
    fn to_account(self) -> Result<Account, Box<dyn Error>> {
        let id = self.id.as_str();
        let kind = match AccountType::from_tag(self.account_type.trim()) {
            Some(AccountType::Retirement401k) => AccountKind::Retirement401k(Retirement401kTerms {
                rate_of_return: required(id, "rateOfReturn", self.rate_of_return)?,
                has_company_match: parse_flag("hasCompanyMatch", self.has_company_match.as_deref())?,
                match_percentage: self.match_percentage.unwrap_or(0.0),
                match_up_to_percentage: self.match_up_to_percentage.unwrap_or(0.0),
                contribution_percentage: self.contribution_percentage,
            }),
            Some(AccountType::Dividend) => AccountKind::Dividend(DividendTerms {
                expected_yield: required(id, "expectedYield", self.expected_yield)?,
                underlying_asset_growth: required(
                    id,
                    "underlyingAssetGrowth",
                    self.underlying_asset_growth,
                )?,
                drip_enabled: parse_flag("dripEnabled", self.drip_enabled.as_deref())?,
            }),
            Some(AccountType::Hysa) => AccountKind::Hysa(HysaTerms {
                apy: required(id, "apy", self.apy)?,
            }),
            Some(AccountType::Brokerage) => AccountKind::Brokerage(BrokerageTerms {
                expected_return_rate: required(id, "expectedReturnRate", self.expected_return_rate)?,
            }),
            None => {
                log::warn!("Account {}: unsupported type {:?}", id, self.account_type);
                AccountKind::Unsupported
            }
        };

        let created_at = match self.created_at {
            Some(secs) => Some(
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .ok_or_else(|| format!("Account {}: invalid createdAt {}", id, secs))?,
            ),
            None => None,
        };

        Ok(Account {
            id: self.id,
            nickname: self.nickname.filter(|n| !n.trim().is_empty()),
            current_balance: self.current_balance,
            monthly_contribution: self.monthly_contribution.unwrap_or(0.0),
            time_horizon: self.time_horizon,
            kind,
            created_at,
        })
    }
}

/// Load a JSON portfolio file
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<Portfolio, Box<dyn Error>> {
    let file = File::open(path)?;
    load_portfolio_from_reader(BufReader::new(file))
}

/// Load a JSON portfolio from any reader (e.g., request body, string buffer)
pub fn load_portfolio_from_reader<R: std::io::Read>(reader: R) -> Result<Portfolio, Box<dyn Error>> {
    let portfolio: Portfolio = serde_json::from_reader(reader)?;
    portfolio.validate()?;
    log::debug!("Loaded portfolio with {} accounts", portfolio.accounts.len());
    Ok(portfolio)
}

/// Load the portfolio from the default location
pub fn load_default_portfolio() -> Result<Portfolio, Box<dyn Error>> {
    load_portfolio(DEFAULT_PORTFOLIO_PATH)
}

/// Load all accounts from a flat CSV table
pub fn load_accounts_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Account>, Box<dyn Error>> {
    let file = File::open(path)?;
    load_accounts_from_reader(file)
}

/// Load accounts from any reader holding the flat CSV table
pub fn load_accounts_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Account>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut accounts = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let account = row.to_account()?;
        accounts.push(account);
    }

    check_accounts(&accounts)?;
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNTS_CSV: &str = "\
id,type,nickname,currentBalance,monthlyContribution,contributionPercentage,timeHorizon,rateOfReturn,hasCompanyMatch,matchPercentage,matchUpToPercentage,expectedYield,underlyingAssetGrowth,dripEnabled,expectedReturnRate,apy,createdAt
k1,401k,Work,25000,,10,30,7.5,1,50,6,,,,,,1700000000
d1,dividend,,8000,150,,,,,,,3.2,5,true,,,
h1,hysa,Emergency,15000,200,,,,,,,,,,,4.25,
b1,brokerage,,4000,300,,,,,,,,,,8,,
x1,crypto,,100,,,,,,,,,,,,,
";

    #[test]
    fn test_load_accounts_from_csv() {
        let accounts = load_accounts_from_reader(ACCOUNTS_CSV.as_bytes()).expect("Failed to load accounts");
        assert_eq!(accounts.len(), 5);

        let k1 = &accounts[0];
        assert_eq!(k1.display_name(), "Work");
        assert_eq!(k1.time_horizon, Some(30.0));
        assert_eq!(k1.created_at.unwrap().timestamp(), 1_700_000_000);
        match &k1.kind {
            AccountKind::Retirement401k(t) => {
                assert!(t.has_company_match);
                assert_eq!(t.contribution_percentage, Some(10.0));
                assert_eq!(t.match_up_to_percentage, 6.0);
            }
            other => panic!("unexpected kind {:?}", other),
        }

        match &accounts[1].kind {
            AccountKind::Dividend(t) => assert!(t.drip_enabled),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(accounts[1].nickname, None);
        assert_eq!(accounts[2].monthly_contribution, 200.0);
        assert_eq!(accounts[3].account_type(), Some(AccountType::Brokerage));
        assert_eq!(accounts[4].kind, AccountKind::Unsupported);
    }

    #[test]
    fn test_csv_missing_rate_is_an_error() {
        let csv = "\
id,type,nickname,currentBalance,monthlyContribution,contributionPercentage,timeHorizon,rateOfReturn,hasCompanyMatch,matchPercentage,matchUpToPercentage,expectedYield,underlyingAssetGrowth,dripEnabled,expectedReturnRate,apy,createdAt
h1,hysa,,1000,10,,,,,,,,,,,,
";
        let err = load_accounts_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing apy"), "{}", err);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let csv = "\
id,type,nickname,currentBalance,monthlyContribution,contributionPercentage,timeHorizon,rateOfReturn,hasCompanyMatch,matchPercentage,matchUpToPercentage,expectedYield,underlyingAssetGrowth,dripEnabled,expectedReturnRate,apy,createdAt
h1,hysa,,1000,10,,,,,,,,,,,4,
h1,hysa,,2000,10,,,,,,,,,,,4,
";
        let err = load_accounts_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate account id"), "{}", err);
    }

    #[test]
    fn test_load_portfolio_json() {
        let json = r#"{
            "profile": {"currentAge": 30, "retirementAge": 65, "currentSalary": 90000, "salaryGrowthRate": 3},
            "accounts": [
                {"id": "h1", "type": "hysa", "currentBalance": 10000, "monthlyContribution": 100, "apy": 4.5},
                {"id": "b1", "type": "brokerage", "currentBalance": 5000, "monthlyContribution": 250, "expectedReturnRate": 7}
            ]
        }"#;
        let portfolio = load_portfolio_from_reader(json.as_bytes()).expect("Failed to load portfolio");
        assert_eq!(portfolio.profile.retirement_age, 65);
        assert_eq!(portfolio.accounts.len(), 2);
        assert!(portfolio.account("b1").is_some());
        assert!(portfolio.account("zz").is_none());
    }

    #[test]
    fn test_json_and_csv_flags_agree() {
        let json = r#"{
            "profile": {"currentAge": 30, "retirementAge": 65, "currentSalary": 90000, "salaryGrowthRate": 3},
            "accounts": [
                {"id": "d1", "type": "dividend", "currentBalance": 8000, "monthlyContribution": 150,
                 "expectedYield": 3.2, "underlyingAssetGrowth": 5, "dripEnabled": 1}
            ]
        }"#;
        let portfolio = load_portfolio_from_reader(json.as_bytes()).expect("Failed to load portfolio");
        let from_csv = load_accounts_from_reader(ACCOUNTS_CSV.as_bytes()).expect("Failed to load accounts");

        assert_eq!(portfolio.accounts[0].kind, from_csv[1].kind);
    }

    #[test]
    fn test_load_sample_portfolio() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_PORTFOLIO_PATH);
        let portfolio = load_portfolio(&path).expect("Failed to load sample portfolio");

        let types: Vec<_> = portfolio.accounts.iter().filter_map(Account::account_type).collect();
        assert_eq!(types, AccountType::ALL.to_vec());
        assert!(portfolio.profile.created_at.is_some());
        assert_eq!(portfolio.account("acct-hysa").map(|a| a.display_name()), Some("Emergency Fund"));
    }

    #[test]
    fn test_portfolio_with_invalid_profile_rejected() {
        let json = r#"{
            "profile": {"currentAge": 60, "retirementAge": 55, "currentSalary": 90000, "salaryGrowthRate": 3},
            "accounts": []
        }"#;
        let err = load_portfolio_from_reader(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("retirementAge"), "{}", err);
    }
}
