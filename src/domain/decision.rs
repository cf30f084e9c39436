use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of reason codes surfaced to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "USER_NOT_FOUND")]
    UserNotFound,
    #[serde(rename = "EXCHANGE_RATE_ERROR")]
    ExchangeRateError,
    #[serde(rename = "MERCHANT_CATEGORY_BLOCKED")]
    MerchantCategoryBlocked,
    #[serde(rename = "BALANCE_CHECK_ERROR")]
    BalanceCheckError,
    #[serde(rename = "INSUFFICIENT_FUNDS")]
    InsufficientFunds,
    #[default]
    #[serde(rename = "system_error")]
    SystemError,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Approved => "approved",
            Reason::UserNotFound => "USER_NOT_FOUND",
            Reason::ExchangeRateError => "EXCHANGE_RATE_ERROR",
            Reason::MerchantCategoryBlocked => "MERCHANT_CATEGORY_BLOCKED",
            Reason::BalanceCheckError => "BALANCE_CHECK_ERROR",
            Reason::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Reason::SystemError => "system_error",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The terminal outcome for one transaction.
///
/// Fields are private so a decision cannot change after it is built, and the
/// constructors keep `approved` and `reason` consistent with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDecision {
    transaction_id: String,
    approved: bool,
    reason: Reason,
    process_time_ms: u64,
    currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

impl AuthorizationDecision {
    pub fn approved(
        transaction_id: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        process_time_ms: u64,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            approved: true,
            reason: Reason::Approved,
            process_time_ms,
            currency: currency.into(),
            amount,
        }
    }

    /// Builds a decline. Passing `Reason::Approved` yields `system_error`
    /// since a decline can never carry the approval code.
    pub fn declined(
        transaction_id: impl Into<String>,
        reason: Reason,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        let reason = match reason {
            Reason::Approved => Reason::SystemError,
            other => other,
        };
        Self {
            transaction_id: transaction_id.into(),
            approved: false,
            reason,
            process_time_ms: 0,
            currency: currency.into(),
            amount,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn process_time_ms(&self) -> u64 {
        self.process_time_ms
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}
