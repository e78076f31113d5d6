//! Error types raised by the forecast engine
//!
//! The engine never guesses around bad numbers: a non-finite field stops the
//! forecast with an error naming the record and the field.

use thiserror::Error;

/// An account record carries a numeric field the engine cannot compound
#[derive(Debug, Clone, PartialEq, Error)]
#[error("account {account_id}: invalid {field} ({value})")]
pub struct InvalidAccountError {
    /// Identifier of the offending account
    pub account_id: String,
    /// Wire name of the offending field
    pub field: &'static str,
    /// Value as received
    pub value: f64,
}

impl InvalidAccountError {
    pub fn new(account_id: impl Into<String>, field: &'static str, value: f64) -> Self {
        Self {
            account_id: account_id.into(),
            field,
            value,
        }
    }
}

/// The planner profile fails a numeric or save-time check
#[derive(Debug, Clone, PartialEq, Error)]
#[error("profile: {field} {reason}")]
pub struct InvalidProfileError {
    /// Wire name of the offending field
    pub field: &'static str,
    /// Human readable reason
    pub reason: String,
}

impl InvalidProfileError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Any failure while projecting accounts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error(transparent)]
    InvalidAccount(#[from] InvalidAccountError),

    #[error(transparent)]
    InvalidProfile(#[from] InvalidProfileError),

    #[error("config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}
