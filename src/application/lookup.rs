use super::engine::{AuthorizationEngine, bounded};
use crate::domain::account::Account;
use crate::domain::ports::account_key;
use crate::error::Result;

impl AuthorizationEngine {
    /// Resolves the spending account for `user_id`.
    ///
    /// The cache is tried first. A miss, a cache failure or an undecodable
    /// cached record all fall through to the durable store; a hit never
    /// touches the store. `None` means the user could not be found.
    pub async fn resolve_account(&self, user_id: &str) -> Option<Account> {
        if user_id.is_empty() {
            return None;
        }

        match self.cached_account(user_id).await {
            Ok(Some(account)) => return Some(account),
            Ok(None) => log::debug!("Cache miss for user {}", user_id),
            Err(e) => log::warn!(
                "Cache lookup for user {} failed, falling back to store: {}",
                user_id,
                e
            ),
        }

        match bounded(
            self.settings.store_timeout,
            "account read",
            self.store.get_account(user_id),
        )
        .await
        {
            Ok(account) => account,
            Err(e) => {
                log::error!("Store lookup for user {} failed: {}", user_id, e);
                None
            }
        }
    }

    async fn cached_account(&self, user_id: &str) -> Result<Option<Account>> {
        let key = account_key(user_id);
        let raw = bounded(self.settings.store_timeout, "cache read", self.cache.get(&key)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
