use super::engine::{AuthorizationEngine, bounded};
use crate::domain::currency::{Conversion, ConversionRecord, ExchangeRate};
use crate::domain::ports::rate_key;
use crate::domain::transaction::BASE_CURRENCY;
use crate::error::Result;
use rust_decimal::Decimal;

impl AuthorizationEngine {
    /// Resolves the quote for `currency`.
    ///
    /// A missing key falls back to the fixed rates; a cache failure or a quote
    /// that cannot be parsed is an error.
    pub async fn resolve_rate(&self, currency: &str) -> Result<ExchangeRate> {
        let key = rate_key(currency);
        let cached = bounded(self.settings.store_timeout, "rate read", self.cache.get(&key)).await?;
        match cached {
            Some(raw) => ExchangeRate::parse_cached(currency, &raw),
            None => {
                log::debug!("No cached quote for {}, using fallback rate", currency);
                Ok(ExchangeRate::fallback(currency))
            }
        }
    }

    /// Converts `amount` from the base currency into `funding` and dispatches
    /// the compliance audit record without waiting for it.
    pub async fn convert(&self, user_id: &str, amount: Decimal, funding: &str) -> Result<Conversion> {
        let rate = self.resolve_rate(funding).await?;
        let spread = self.settings.spreads.spread_for(funding);
        let conversion = Conversion::compute(BASE_CURRENCY, amount, &rate, spread)?;

        self.dispatch_audit(ConversionRecord::new(user_id, &conversion));
        Ok(conversion)
    }

    /// Writes the audit record on a detached task. The task owns its inputs
    /// and only logs failures; the caller never observes the outcome.
    fn dispatch_audit(&self, record: ConversionRecord) {
        let store = self.store.clone();
        let limit = self.settings.store_timeout;
        tokio::spawn(async move {
            let user_id = record.user_id.clone();
            if let Err(e) = bounded(limit, "conversion audit", store.insert_conversion(record)).await {
                log::error!("Failed to log conversion for {}: {}", user_id, e);
            }
        });
    }
}
