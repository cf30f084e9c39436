use super::transaction::BASE_CURRENCY;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Funds held by an account in a single currency.
///
/// Only the durable store ever changes a balance; the engine reads it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// True when the balance is at least `required`. Equality counts as covered.
    pub fn covers(&self, required: Decimal) -> bool {
        self.0 >= required
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A spending account as held by the durable store and mirrored in the cache.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, alias = "preferred_display_currency", alias = "preferred_currency")]
    pub preferred_currency: String,
    #[serde(default, alias = "account_type")]
    pub account_type: String,
}

impl Account {
    pub fn new(id: impl Into<String>, preferred_currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: AccountStatus::Active,
            preferred_currency: preferred_currency.into(),
            account_type: "personal".to_string(),
        }
    }

    /// The currency the account actually holds funds in.
    ///
    /// An unset preference means the account is funded in the base currency.
    pub fn funding_currency(&self) -> &str {
        if self.preferred_currency.is_empty() {
            BASE_CURRENCY
        } else {
            &self.preferred_currency
        }
    }
}
