use crate::domain::account::{Account, Balance};
use crate::domain::currency::ConversionRecord;
use crate::domain::decision::AuthorizationDecision;
use crate::domain::ports::{Cache, DecisionPublisher, DurableStore};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// A thread-safe in-memory key-value cache with optional per-entry TTL.
///
/// Expired entries read as misses, matching a read-through cache whose copy
/// is only valid for a bounded time.
#[derive(Default, Clone)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, key: impl Into<String>, value: impl Into<String>, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value: value.into(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Stores `value` JSON encoded under `key`.
    pub async fn put_json<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.put(key, encoded, ttl).await;
        Ok(())
    }

    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }
}

/// A thread-safe in-memory durable store.
///
/// Holds accounts, per-currency balances and the conversion audit log behind
/// `Arc<RwLock<..>>`, so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    balances: Arc<RwLock<HashMap<(String, String), Balance>>>,
    conversions: Arc<RwLock<Vec<ConversionRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_account(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }

    pub async fn set_balance(&self, account_id: &str, currency: &str, balance: Balance) {
        self.balances
            .write()
            .await
            .insert((account_id.to_string(), currency.to_string()), balance);
    }

    /// Snapshot of the conversion audit log.
    pub async fn conversions(&self) -> Vec<ConversionRecord> {
        self.conversions.read().await.clone()
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account_id).cloned())
    }

    async fn get_balance(&self, account_id: &str, currency: &str) -> Result<Option<Balance>> {
        let balances = self.balances.read().await;
        Ok(balances
            .get(&(account_id.to_string(), currency.to_string()))
            .copied())
    }

    async fn insert_conversion(&self, record: ConversionRecord) -> Result<()> {
        self.conversions.write().await.push(record);
        Ok(())
    }
}

/// A publisher that keeps every published decision, with its exchange and
/// routing key, in memory.
#[derive(Default, Clone)]
pub struct InMemoryPublisher {
    published: Arc<RwLock<Vec<(String, String, AuthorizationDecision)>>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self) -> Vec<(String, String, AuthorizationDecision)> {
        self.published.read().await.clone()
    }

    pub async fn decisions(&self) -> Vec<AuthorizationDecision> {
        self.published
            .read()
            .await
            .iter()
            .map(|(_, _, decision)| decision.clone())
            .collect()
    }
}

#[async_trait]
impl DecisionPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        decision: &AuthorizationDecision,
    ) -> Result<()> {
        self.published.write().await.push((
            exchange.to_string(),
            routing_key.to_string(),
            decision.clone(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::{Conversion, ExchangeRate};
    use crate::domain::decision::Reason;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_in_memory_cache_get_and_miss() {
        let cache = InMemoryCache::new();
        cache.put("rate:EUR", "0.92", None).await;

        assert_eq!(cache.get("rate:EUR").await.unwrap().as_deref(), Some("0.92"));
        assert!(cache.get("rate:GBP").await.unwrap().is_none());

        cache.remove("rate:EUR").await;
        assert!(cache.get("rate:EUR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_cache_expires_entries() {
        let cache = InMemoryCache::new();
        cache.put("user:u-1", "{}", Some(Duration::ZERO)).await;
        assert!(cache.get("user:u-1").await.unwrap().is_none());

        cache.put("user:u-2", "{}", Some(Duration::from_secs(60))).await;
        assert!(cache.get("user:u-2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_in_memory_store_accounts_and_balances() {
        let store = InMemoryStore::new();
        store.insert_account(Account::new("u-1", "EUR")).await;
        store.set_balance("u-1", "EUR", Balance::new(dec!(12.5))).await;

        let account = store.get_account("u-1").await.unwrap().unwrap();
        assert_eq!(account.preferred_currency, "EUR");
        assert!(store.get_account("u-2").await.unwrap().is_none());

        assert_eq!(
            store.get_balance("u-1", "EUR").await.unwrap(),
            Some(Balance::new(dec!(12.5)))
        );
        assert!(store.get_balance("u-1", "USD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_conversion_log() {
        let store = InMemoryStore::new();
        let conversion =
            Conversion::compute("USD", dec!(10), &ExchangeRate::fallback("EUR"), dec!(0.005))
                .unwrap();
        store
            .insert_conversion(ConversionRecord::new("u-1", &conversion))
            .await
            .unwrap();

        let logged = store.conversions().await;
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].to_currency, "EUR");
    }

    #[tokio::test]
    async fn test_in_memory_publisher_records_routing() {
        let publisher = InMemoryPublisher::new();
        let decision = AuthorizationDecision::declined("tx-1", Reason::UserNotFound, dec!(1), "USD");
        publisher
            .publish("transactions", "jit-funding.decision", &decision)
            .await
            .unwrap();

        let published = publisher.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "transactions");
        assert_eq!(published[0].1, "jit-funding.decision");
        assert_eq!(published[0].2, decision);
    }
}
