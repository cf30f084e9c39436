#![allow(dead_code)]

use async_trait::async_trait;
use jit_funding::application::engine::AuthorizationEngine;
use jit_funding::config::EngineSettings;
use jit_funding::domain::account::{Account, Balance};
use jit_funding::domain::currency::ConversionRecord;
use jit_funding::domain::decision::AuthorizationDecision;
use jit_funding::domain::ports::{Cache, DecisionPublisher, DurableStore};
use jit_funding::domain::transaction::{Amount, Transaction};
use jit_funding::error::{AuthError, Result};
use jit_funding::infrastructure::in_memory::InMemoryStore;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn transaction(id: &str, user: &str, amount: Decimal) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        user_id: user.to_string(),
        card_id: "card-1".to_string(),
        amount: Amount::new(amount).unwrap(),
        currency: "USD".to_string(),
        merchant_name: "Local Pizza Shop".to_string(),
        merchant_category: "5812".to_string(),
    }
}

pub fn engine(cache: impl Cache + 'static, store: impl DurableStore + 'static) -> AuthorizationEngine {
    AuthorizationEngine::new(Arc::new(cache), Arc::new(store), EngineSettings::default())
}

/// Store seeded with one account funded in `currency`.
pub async fn funded_store(user: &str, currency: &str, balance: Decimal) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_account(Account::new(user, currency)).await;
    store.set_balance(user, currency, Balance::new(balance)).await;
    store
}

/// A cache whose every read fails.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(AuthError::internal("cache connection refused"))
    }
}

/// A cache that never answers within any reasonable timeout.
pub struct StalledCache;

#[async_trait]
impl Cache for StalledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok(None)
    }
}

/// Wraps an in-memory store and lets individual operations be made to fail.
#[derive(Clone, Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    pub fail_accounts: bool,
    pub fail_balances: bool,
    pub stall_balances: bool,
    pub fail_audit: bool,
    pub account_reads: Arc<AtomicUsize>,
}

impl FaultyStore {
    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for FaultyStore {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_accounts {
            return Err(AuthError::internal("accounts table unavailable"));
        }
        self.inner.get_account(account_id).await
    }

    async fn get_balance(&self, account_id: &str, currency: &str) -> Result<Option<Balance>> {
        if self.fail_balances {
            return Err(AuthError::internal("balances table unavailable"));
        }
        if self.stall_balances {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
        self.inner.get_balance(account_id, currency).await
    }

    async fn insert_conversion(&self, record: ConversionRecord) -> Result<()> {
        if self.fail_audit {
            return Err(AuthError::internal("audit insert rejected"));
        }
        self.inner.insert_conversion(record).await
    }
}

/// A publisher that fails the first `failures` publishes, then succeeds.
#[derive(Default)]
pub struct FlakyPublisher {
    pub failures: usize,
    pub attempts: AtomicUsize,
    pub delivered: tokio::sync::Mutex<Vec<AuthorizationDecision>>,
}

impl FlakyPublisher {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DecisionPublisher for FlakyPublisher {
    async fn publish(
        &self,
        _exchange: &str,
        _routing_key: &str,
        decision: &AuthorizationDecision,
    ) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(AuthError::internal("broker channel closed"));
        }
        self.delivered.lock().await.push(decision.clone());
        Ok(())
    }
}

/// Writes `rows` transaction messages for `user_id`, one JSON object per line.
pub fn generate_jsonl(path: &Path, rows: usize, user_id: &str) -> std::result::Result<(), Error> {
    let mut file = File::create(path)?;
    for i in 1..=rows {
        writeln!(
            file,
            r#"{{"transactionId":"tx-{i}","userId":"{user_id}","cardId":"card-1","amount":1.0,"currency":"USD","merchantName":"UBER TRIP","merchantCategory":"4121"}}"#
        )?;
    }
    file.flush()?;
    Ok(())
}
