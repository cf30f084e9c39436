use crate::domain::account::{Account, AccountStatus, Balance};
use crate::error::{AuthError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

/// `id,status,preferred_currency,account_type`
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AccountRow {
    pub id: String,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub preferred_currency: String,
    #[serde(default)]
    pub account_type: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            preferred_currency: row.preferred_currency,
            account_type: row.account_type,
        }
    }
}

/// `user_id,currency,balance`
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct BalanceRow {
    pub user_id: String,
    pub currency: String,
    pub balance: Balance,
}

/// `currency,rate`
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RateRow {
    pub currency: String,
    pub rate: Decimal,
}

/// Reads seed rows from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// and yields rows lazily so large seed files stream.
pub struct SeedReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SeedReader<R> {
    /// Creates a new `SeedReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn rows<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AuthError::from))
    }
}
