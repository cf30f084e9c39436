use crate::config::EngineSettings;
use crate::domain::account::Balance;
use crate::domain::decision::{AuthorizationDecision, Reason};
use crate::domain::enrichment::enrich_merchant;
use crate::domain::ports::{CacheRef, DurableStoreRef};
use crate::domain::transaction::{BASE_CURRENCY, Transaction};
use crate::error::{AuthError, Result};
use std::future::Future;
use std::time::{Duration, Instant};

/// Runs `call` with an upper bound on how long it may take.
pub(crate) async fn bounded<T>(
    limit: Duration,
    what: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Timeout(what)),
    }
}

/// The authorization decision pipeline.
///
/// `AuthorizationEngine` is the explicit context shared by every worker: it
/// owns handles to the cache and the durable store plus the engine settings,
/// and is built once by the process lifecycle. Stages run strictly in order
/// and each one is awaited before the next starts.
pub struct AuthorizationEngine {
    pub(crate) cache: CacheRef,
    pub(crate) store: DurableStoreRef,
    pub(crate) settings: EngineSettings,
}

impl AuthorizationEngine {
    /// Creates a new `AuthorizationEngine`.
    ///
    /// # Arguments
    ///
    /// * `cache` - Fast key-value cache for accounts and exchange rates.
    /// * `store` - Durable store for accounts, balances and the conversion log.
    /// * `settings` - Timeouts and policy.
    pub fn new(cache: CacheRef, store: DurableStoreRef, settings: EngineSettings) -> Self {
        Self {
            cache,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Produces exactly one decision for `tx`.
    pub async fn authorize(&self, tx: &Transaction) -> AuthorizationDecision {
        let started = Instant::now();
        let decision = self.decide(tx, started).await;

        let elapsed = started.elapsed();
        if elapsed > self.settings.slow_decision {
            log::warn!(
                "Slow authorization for {}: {}ms (reason={}, approved={})",
                tx.transaction_id,
                elapsed.as_millis(),
                decision.reason(),
                decision.is_approved()
            );
        }
        decision
    }

    async fn decide(&self, tx: &Transaction, started: Instant) -> AuthorizationDecision {
        // Amounts are USD-denominated until a conversion replaces them with
        // the funding currency. Declines report whatever was current.
        let mut amount = tx.amount.value();
        let mut currency = BASE_CURRENCY.to_string();

        let Some(account) = self.resolve_account(&tx.user_id).await else {
            return AuthorizationDecision::declined(
                &tx.transaction_id,
                Reason::UserNotFound,
                amount,
                currency,
            );
        };

        let funding = account.funding_currency().to_string();
        if funding != BASE_CURRENCY {
            match self.convert(&account.id, tx.amount.value(), &funding).await {
                Ok(conversion) => {
                    amount = conversion.target_amount;
                    currency = funding.clone();
                }
                Err(e) => {
                    log::warn!(
                        "Exchange rate for {} unavailable on {}: {}",
                        funding,
                        tx.transaction_id,
                        e
                    );
                    return AuthorizationDecision::declined(
                        &tx.transaction_id,
                        Reason::ExchangeRateError,
                        amount,
                        currency,
                    );
                }
            }
        }

        let merchant = enrich_merchant(&tx.merchant_name, &tx.merchant_category);
        if self.settings.blocked_groups.contains(&merchant.group) {
            log::info!(
                "Blocked {} at {} ({} / {})",
                tx.transaction_id,
                merchant.name,
                merchant.category,
                merchant.group
            );
            return AuthorizationDecision::declined(
                &tx.transaction_id,
                Reason::MerchantCategoryBlocked,
                amount,
                currency,
            );
        }

        let balance = match self.read_balance(&account.id, &funding).await {
            Ok(balance) => balance,
            Err(e) => {
                log::error!(
                    "Balance check failed for {} ({}): {}",
                    account.id,
                    funding,
                    e
                );
                return AuthorizationDecision::declined(
                    &tx.transaction_id,
                    Reason::BalanceCheckError,
                    amount,
                    currency,
                );
            }
        };

        if !balance.covers(amount) {
            return AuthorizationDecision::declined(
                &tx.transaction_id,
                Reason::InsufficientFunds,
                amount,
                currency,
            );
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AuthorizationDecision::approved(&tx.transaction_id, amount, currency, elapsed_ms)
    }

    /// Reads the balance for one (account, currency) pair. Never cached.
    async fn read_balance(&self, account_id: &str, currency: &str) -> Result<Balance> {
        bounded(
            self.settings.store_timeout,
            "balance read",
            self.store.get_balance(account_id, currency),
        )
        .await?
        .ok_or_else(|| {
            AuthError::Validation(format!(
                "No {} balance recorded for account {}",
                currency, account_id
            ))
        })
    }
}
