use crate::domain::account::{Account, Balance};
use crate::domain::currency::ConversionRecord;
use crate::domain::ports::DurableStore;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing accounts.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing per-currency balances.
pub const CF_BALANCES: &str = "balances";
/// Column Family for the conversion audit log.
pub const CF_CONVERSIONS: &str = "conversion_logs";

/// A persistent durable store implementation using RocksDB.
///
/// Accounts, balances and conversion audit rows live in separate Column
/// Families. Values are JSON encoded.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

fn balance_key(account_id: &str, currency: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(account_id.len() + currency.len() + 1);
    key.extend_from_slice(account_id.as_bytes());
    key.push(0);
    key.extend_from_slice(currency.as_bytes());
    key
}

fn conversion_key(record: &ConversionRecord) -> Vec<u8> {
    let nanos = record.recorded_at.timestamp_nanos_opt().unwrap_or_default();
    let mut key = nanos.to_be_bytes().to_vec();
    key.extend_from_slice(record.user_id.as_bytes());
    key
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_BALANCES, CF_CONVERSIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| AuthError::internal(format!("{} column family not found", cf_name)))?;
        let value = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| AuthError::internal(format!("{} column family not found", cf_name)))?;
        match self.db.get_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_account(&self, account: &Account) -> Result<()> {
        self.put_json(CF_ACCOUNTS, account.id.as_bytes(), account)
    }

    pub fn put_balance(&self, account_id: &str, currency: &str, balance: Balance) -> Result<()> {
        self.put_json(CF_BALANCES, &balance_key(account_id, currency), &balance)
    }

    /// All audit rows in the order they were recorded.
    pub fn conversions(&self) -> Result<Vec<ConversionRecord>> {
        let cf = self
            .db
            .cf_handle(CF_CONVERSIONS)
            .ok_or_else(|| AuthError::internal("conversion_logs column family not found"))?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl DurableStore for RocksDBStore {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        self.get_json(CF_ACCOUNTS, account_id.as_bytes())
    }

    async fn get_balance(&self, account_id: &str, currency: &str) -> Result<Option<Balance>> {
        self.get_json(CF_BALANCES, &balance_key(account_id, currency))
    }

    async fn insert_conversion(&self, record: ConversionRecord) -> Result<()> {
        self.put_json(CF_CONVERSIONS, &conversion_key(&record), &record)
    }
}
