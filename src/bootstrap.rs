//! Populates the backing stores from CSV seed files at start-up.

use crate::config::SeedSettings;
use crate::domain::account::{Account, Balance};
use crate::domain::ports::{account_key, rate_key};
use crate::error::Result;
use crate::infrastructure::in_memory::{InMemoryCache, InMemoryStore};
use crate::interfaces::csv::seed_reader::{AccountRow, BalanceRow, RateRow, SeedReader};
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;

/// A durable store that accepts seed data.
#[async_trait]
pub trait SeedableStore: Send + Sync {
    async fn seed_account(&self, account: Account) -> Result<()>;
    async fn seed_balance(&self, account_id: &str, currency: &str, balance: Balance) -> Result<()>;
}

#[async_trait]
impl SeedableStore for InMemoryStore {
    async fn seed_account(&self, account: Account) -> Result<()> {
        self.insert_account(account).await;
        Ok(())
    }

    async fn seed_balance(&self, account_id: &str, currency: &str, balance: Balance) -> Result<()> {
        self.set_balance(account_id, currency, balance).await;
        Ok(())
    }
}

#[cfg(feature = "storage-rocksdb")]
#[async_trait]
impl SeedableStore for crate::infrastructure::rocksdb::RocksDBStore {
    async fn seed_account(&self, account: Account) -> Result<()> {
        self.put_account(&account)
    }

    async fn seed_balance(&self, account_id: &str, currency: &str, balance: Balance) -> Result<()> {
        self.put_balance(account_id, currency, balance)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub accounts: usize,
    pub balances: usize,
    pub rates: usize,
    pub skipped: usize,
}

fn open_rows<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<impl Iterator<Item = Result<T>>> {
    let file = File::open(path)?;
    Ok(SeedReader::new(file).rows())
}

/// Loads every configured seed file. Malformed rows are logged and skipped.
pub async fn seed(
    settings: &SeedSettings,
    cache: &InMemoryCache,
    store: &dyn SeedableStore,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    if let Some(path) = &settings.accounts {
        for row in open_rows::<AccountRow>(path)? {
            match row {
                Ok(row) => {
                    let account = Account::from(row);
                    if settings.warm_cache {
                        cache
                            .put_json(account_key(&account.id), &account, settings.cache_ttl)
                            .await?;
                    }
                    store.seed_account(account).await?;
                    summary.accounts += 1;
                }
                Err(e) => {
                    log::warn!("Skipping account row in {}: {}", path.display(), e);
                    summary.skipped += 1;
                }
            }
        }
    }

    if let Some(path) = &settings.balances {
        for row in open_rows::<BalanceRow>(path)? {
            match row {
                Ok(row) => {
                    store
                        .seed_balance(&row.user_id, &row.currency, row.balance)
                        .await?;
                    summary.balances += 1;
                }
                Err(e) => {
                    log::warn!("Skipping balance row in {}: {}", path.display(), e);
                    summary.skipped += 1;
                }
            }
        }
    }

    if let Some(path) = &settings.rates {
        for row in open_rows::<RateRow>(path)? {
            match row {
                Ok(row) => {
                    cache
                        .put(rate_key(&row.currency), row.rate.to_string(), settings.cache_ttl)
                        .await;
                    summary.rates += 1;
                }
                Err(e) => {
                    log::warn!("Skipping rate row in {}: {}", path.display(), e);
                    summary.skipped += 1;
                }
            }
        }
    }

    log::info!(
        "Seeded {} accounts, {} balances, {} rates ({} rows skipped)",
        summary.accounts,
        summary.balances,
        summary.rates,
        summary.skipped
    );
    Ok(summary)
}
