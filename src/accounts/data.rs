//! Account records matching the stored portfolio format

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InvalidAccountError;

/// Account type tag, independent of the variant-specific terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "401k")]
    Retirement401k,
    #[serde(rename = "dividend")]
    Dividend,
    #[serde(rename = "hysa")]
    Hysa,
    #[serde(rename = "brokerage")]
    Brokerage,
}

impl AccountType {
    pub const ALL: [AccountType; 4] = [
        AccountType::Retirement401k,
        AccountType::Dividend,
        AccountType::Hysa,
        AccountType::Brokerage,
    ];

    /// Parse the wire tag (`401k`, `dividend`, `hysa`, `brokerage`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Retirement401k => "401k",
            AccountType::Dividend => "dividend",
            AccountType::Hysa => "hysa",
            AccountType::Brokerage => "brokerage",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Retirement401k => "401(k)",
            AccountType::Dividend => "Dividend Investing",
            AccountType::Hysa => "High Yield Savings Account",
            AccountType::Brokerage => "Regular Brokerage",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a stored flag: `0`/`1`, `true`/`false` (any case), or empty for false
pub(crate) fn parse_flag_text(raw: &str) -> Option<bool> {
    match raw.trim() {
        "" | "0" => Some(false),
        "1" => Some(true),
        other if other.eq_ignore_ascii_case("true") => Some(true),
        other if other.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Flags arrive as JSON booleans or as stored 0/1 integers
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match StoredFlag::deserialize(deserializer)? {
        StoredFlag::Bool(flag) => Ok(flag),
        StoredFlag::Int(0) => Ok(false),
        StoredFlag::Int(1) => Ok(true),
        StoredFlag::Int(other) => Err(D::Error::custom(format!("invalid flag {}, expected 0 or 1", other))),
        StoredFlag::Text(text) => {
            parse_flag_text(&text).ok_or_else(|| D::Error::custom(format!("invalid flag {:?}", text)))
        }
    }
}

/// 401(k) return and employer match terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retirement401kTerms {
    /// Expected annual return in percent
    pub rate_of_return: f64,

    /// Whether the employer matches contributions
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub has_company_match: bool,

    /// Share of the matchable contribution the employer adds, in percent
    #[serde(default)]
    pub match_percentage: f64,

    /// Cap on matchable contributions as a percent of salary
    #[serde(default)]
    pub match_up_to_percentage: f64,

    /// Employee contribution as a percent of salary; overrides the fixed
    /// monthly contribution when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_percentage: Option<f64>,
}

impl Retirement401kTerms {
    /// Employee contribution for one month at the given annual salary
    pub fn employee_contribution(&self, fixed_monthly: f64, salary: f64) -> f64 {
        match self.contribution_percentage {
            Some(pct) => pct * salary / 100.0 / 12.0,
            None => fixed_monthly,
        }
    }

    /// Employer match for one month's employee contribution
    ///
    /// Only the part of the contribution up to `match_up_to_percentage` of
    /// monthly salary is matched.
    pub fn employer_match(&self, contribution: f64, salary: f64) -> f64 {
        if !self.has_company_match {
            return 0.0;
        }
        let max_matchable = (salary * self.match_up_to_percentage / 100.0) / 12.0;
        contribution.min(max_matchable) * (self.match_percentage / 100.0)
    }

    /// Salary percentage implied by a fixed monthly contribution
    pub fn implied_percentage(monthly_contribution: f64, salary: f64) -> Option<f64> {
        if salary > 0.0 {
            Some(monthly_contribution * 12.0 / salary * 100.0)
        } else {
            None
        }
    }
}

/// Dividend-investing terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendTerms {
    /// Annual dividend yield in percent
    pub expected_yield: f64,

    /// Annual price appreciation of the holding in percent
    pub underlying_asset_growth: f64,

    /// Reinvest dividends instead of paying them out
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub drip_enabled: bool,
}

/// High-yield savings terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HysaTerms {
    /// Annual percentage yield in percent
    pub apy: f64,
}

/// Taxable brokerage terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerageTerms {
    /// Expected annual total return in percent
    pub expected_return_rate: f64,
}

/// Variant-specific part of an account, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccountKind {
    #[serde(rename = "401k")]
    Retirement401k(Retirement401kTerms),
    #[serde(rename = "dividend")]
    Dividend(DividendTerms),
    #[serde(rename = "hysa")]
    Hysa(HysaTerms),
    #[serde(rename = "brokerage")]
    Brokerage(BrokerageTerms),
    /// Any tag this engine has no simulator for
    #[serde(other)]
    Unsupported,
}

impl AccountKind {
    pub fn account_type(&self) -> Option<AccountType> {
        match self {
            AccountKind::Retirement401k(_) => Some(AccountType::Retirement401k),
            AccountKind::Dividend(_) => Some(AccountType::Dividend),
            AccountKind::Hysa(_) => Some(AccountType::Hysa),
            AccountKind::Brokerage(_) => Some(AccountType::Brokerage),
            AccountKind::Unsupported => None,
        }
    }

    /// Percentage fields with their wire names
    fn rate_fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            AccountKind::Retirement401k(t) => {
                let mut fields = vec![
                    ("rateOfReturn", t.rate_of_return),
                    ("matchPercentage", t.match_percentage),
                    ("matchUpToPercentage", t.match_up_to_percentage),
                ];
                if let Some(pct) = t.contribution_percentage {
                    fields.push(("contributionPercentage", pct));
                }
                fields
            }
            AccountKind::Dividend(t) => vec![
                ("expectedYield", t.expected_yield),
                ("underlyingAssetGrowth", t.underlying_asset_growth),
            ],
            AccountKind::Hysa(t) => vec![("apy", t.apy)],
            AccountKind::Brokerage(t) => vec![("expectedReturnRate", t.expected_return_rate)],
            AccountKind::Unsupported => Vec::new(),
        }
    }
}

/// A single savings or investment account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque unique identifier
    pub id: String,

    /// Optional display name chosen by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Balance today
    pub current_balance: f64,

    /// Fixed monthly contribution
    #[serde(default)]
    pub monthly_contribution: f64,

    /// Horizon entered with the account. Forecasts use the profile-derived
    /// horizon instead; this only feeds the contribution-limit check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<f64>,

    /// Type tag and variant-specific return assumptions
    #[serde(flatten)]
    pub kind: AccountKind,

    /// When the account was first saved (epoch seconds on the wire)
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        current_balance: f64,
        monthly_contribution: f64,
        kind: AccountKind,
    ) -> Self {
        Self {
            id: id.into(),
            nickname: None,
            current_balance,
            monthly_contribution,
            time_horizon: None,
            kind,
            created_at: None,
        }
    }

    pub fn retirement_401k(
        id: impl Into<String>,
        current_balance: f64,
        monthly_contribution: f64,
        terms: Retirement401kTerms,
    ) -> Self {
        Self::new(id, current_balance, monthly_contribution, AccountKind::Retirement401k(terms))
    }

    pub fn dividend(
        id: impl Into<String>,
        current_balance: f64,
        monthly_contribution: f64,
        terms: DividendTerms,
    ) -> Self {
        Self::new(id, current_balance, monthly_contribution, AccountKind::Dividend(terms))
    }

    pub fn hysa(id: impl Into<String>, current_balance: f64, monthly_contribution: f64, apy: f64) -> Self {
        Self::new(id, current_balance, monthly_contribution, AccountKind::Hysa(HysaTerms { apy }))
    }

    pub fn brokerage(
        id: impl Into<String>,
        current_balance: f64,
        monthly_contribution: f64,
        expected_return_rate: f64,
    ) -> Self {
        Self::new(
            id,
            current_balance,
            monthly_contribution,
            AccountKind::Brokerage(BrokerageTerms { expected_return_rate }),
        )
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_time_horizon(mut self, years: f64) -> Self {
        self.time_horizon = Some(years);
        self
    }

    pub fn account_type(&self) -> Option<AccountType> {
        self.kind.account_type()
    }

    /// Nickname if set, otherwise the type label
    pub fn display_name(&self) -> &str {
        match (&self.nickname, self.account_type()) {
            (Some(name), _) if !name.trim().is_empty() => name.as_str(),
            (_, Some(t)) => t.label(),
            _ => self.id.as_str(),
        }
    }

    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("currentBalance", self.current_balance),
            ("monthlyContribution", self.monthly_contribution),
        ];
        if let Some(horizon) = self.time_horizon {
            fields.push(("timeHorizon", horizon));
        }
        fields.extend(self.kind.rate_fields());
        fields
    }

    /// Reject values the engine cannot compound (NaN, infinities)
    pub fn check_finite(&self) -> Result<(), InvalidAccountError> {
        match self.numeric_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            Some((field, value)) => Err(InvalidAccountError::new(&self.id, field, value)),
            None => Ok(()),
        }
    }

    /// Save-time bound checks applied before an account is stored
    pub fn validate(&self) -> Result<(), InvalidAccountError> {
        self.check_finite()?;

        if let Some((field, value)) = self.numeric_fields().into_iter().find(|(_, v)| *v < 0.0) {
            return Err(InvalidAccountError::new(&self.id, field, value));
        }

        if let AccountKind::Retirement401k(terms) = &self.kind {
            if let Some(pct) = terms.contribution_percentage {
                if pct > 100.0 {
                    return Err(InvalidAccountError::new(&self.id, "contributionPercentage", pct));
                }
            }
            if terms.has_company_match {
                if terms.match_percentage <= 0.0 {
                    return Err(InvalidAccountError::new(
                        &self.id,
                        "matchPercentage",
                        terms.match_percentage,
                    ));
                }
                if terms.match_up_to_percentage <= 0.0 {
                    return Err(InvalidAccountError::new(
                        &self.id,
                        "matchUpToPercentage",
                        terms.match_up_to_percentage,
                    ));
                }
            }
        }
        Ok(())
    }
}
