use crate::error::AuthError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency card transactions are presented in unless the message says otherwise.
pub const BASE_CURRENCY: &str = "USD";

/// A non-negative monetary amount as presented by the card network.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, AuthError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AuthError::Validation(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AuthError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}

/// A card authorization request as delivered on the inbound queue.
///
/// Identity is `transaction_id`; the engine never mutates a received transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub card_id: String,
    pub amount: Amount,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub merchant_name: String,
    /// Four digit ISO-18245 merchant category code.
    #[serde(default)]
    pub merchant_category: String,
}
