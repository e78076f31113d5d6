//! Profile and account records and their loaders

mod data;
mod profile;
pub mod loader;

pub use data::{
    Account, AccountKind, AccountType, BrokerageTerms, DividendTerms, HysaTerms,
    Retirement401kTerms,
};
pub use profile::{Profile, MAX_AGE};
pub use loader::{
    load_accounts_csv, load_accounts_from_reader, load_default_portfolio, load_portfolio,
    load_portfolio_from_reader, Portfolio,
};
