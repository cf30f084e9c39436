use super::account::{Account, Balance};
use super::currency::ConversionRecord;
use super::decision::AuthorizationDecision;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Fast key-value cache holding JSON encoded records.
///
/// `Ok(None)` is a miss; `Err` is any other failure talking to the cache.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Durable store that owns accounts, balances and the conversion audit log.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>>;
    async fn get_balance(&self, account_id: &str, currency: &str) -> Result<Option<Balance>>;
    async fn insert_conversion(&self, record: ConversionRecord) -> Result<()>;
}

/// Outbound side of the queue: hands a decision to downstream consumers.
#[async_trait]
pub trait DecisionPublisher: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        decision: &AuthorizationDecision,
    ) -> Result<()>;
}

pub type CacheRef = Arc<dyn Cache>;
pub type DurableStoreRef = Arc<dyn DurableStore>;
pub type PublisherRef = Arc<dyn DecisionPublisher>;

pub fn account_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn rate_key(currency: &str) -> String {
    format!("rate:{}", currency)
}
