use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Rate used for BTC when no quote is cached.
pub const BTC_FALLBACK_RATE: Decimal = dec!(0.00002);

/// A quote for one currency against the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub quote_currency: String,
    pub rate_to_usd: Decimal,
}

impl ExchangeRate {
    pub fn new(quote_currency: impl Into<String>, rate_to_usd: Decimal) -> Result<Self> {
        if rate_to_usd <= Decimal::ZERO {
            return Err(AuthError::Validation(format!(
                "Exchange rate must be positive, got {}",
                rate_to_usd
            )));
        }
        Ok(Self {
            quote_currency: quote_currency.into(),
            rate_to_usd,
        })
    }

    /// Rate assumed when the cache holds no quote for `currency`.
    pub fn fallback(currency: &str) -> Self {
        let rate_to_usd = if currency == "BTC" {
            BTC_FALLBACK_RATE
        } else {
            Decimal::ONE
        };
        Self {
            quote_currency: currency.to_string(),
            rate_to_usd,
        }
    }

    /// Parses a cached quote. Accepts a bare decimal (`"0.92"`, `"2e-5"`) or a
    /// JSON encoded `ExchangeRate` record.
    pub fn parse_cached(currency: &str, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let rate = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok();

        match rate {
            Some(rate) => Self::new(currency, rate),
            None => {
                let record: ExchangeRate = serde_json::from_str(trimmed)?;
                Self::new(currency, record.rate_to_usd)
            }
        }
    }
}

/// Fee embedded in the exchange rate, by asset class.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSchedule {
    pub fiat: Decimal,
    pub crypto: Decimal,
    pub crypto_assets: HashSet<String>,
}

impl Default for SpreadSchedule {
    fn default() -> Self {
        Self {
            fiat: dec!(0.005),
            crypto: dec!(0.02),
            crypto_assets: ["BTC", "ETH"].into_iter().map(String::from).collect(),
        }
    }
}

impl SpreadSchedule {
    pub fn spread_for(&self, currency: &str) -> Decimal {
        if self.crypto_assets.contains(currency) {
            self.crypto
        } else {
            self.fiat
        }
    }
}

/// Outcome of converting a presented amount into the funding currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub source_currency: String,
    pub target_currency: String,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    pub rate: Decimal,
    pub spread: Decimal,
}

impl Conversion {
    /// Applies `spread` to `rate` and converts `amount`.
    ///
    /// effective = rate * (1 - spread); target = amount / effective.
    pub fn compute(
        source_currency: &str,
        amount: Decimal,
        rate: &ExchangeRate,
        spread: Decimal,
    ) -> Result<Self> {
        let effective = rate.rate_to_usd * (Decimal::ONE - spread);
        let target_amount = amount.checked_div(effective).ok_or_else(|| {
            AuthError::Validation(format!(
                "Cannot convert {} {} at effective rate {}",
                amount, source_currency, effective
            ))
        })?;

        Ok(Self {
            source_currency: source_currency.to_string(),
            target_currency: rate.quote_currency.clone(),
            source_amount: amount,
            target_amount,
            rate: rate.rate_to_usd,
            spread,
        })
    }

    pub fn effective_rate(&self) -> Decimal {
        self.rate * (Decimal::ONE - self.spread)
    }
}

/// Compliance audit row for a conversion applied during authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub user_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub amount_source: Decimal,
    pub amount_target: Decimal,
    pub rate_applied: Decimal,
    pub spread_fee: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(user_id: impl Into<String>, conversion: &Conversion) -> Self {
        Self {
            user_id: user_id.into(),
            from_currency: conversion.source_currency.clone(),
            to_currency: conversion.target_currency.clone(),
            amount_source: conversion.source_amount,
            amount_target: conversion.target_amount,
            rate_applied: conversion.rate,
            spread_fee: conversion.spread,
            recorded_at: Utc::now(),
        }
    }
}
