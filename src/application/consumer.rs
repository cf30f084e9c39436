use super::engine::AuthorizationEngine;
use crate::config::ConsumerSettings;
use crate::domain::ports::PublisherRef;
use crate::domain::transaction::Transaction;
use crate::error::{AuthError, Result};
use std::sync::Arc;

/// One raw message taken off the inbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub body: Vec<u8>,
}

impl Delivery {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Decodes the body as a transaction.
    pub fn decode(&self) -> Result<Transaction> {
        let tx: Transaction = serde_json::from_slice(&self.body)?;
        if tx.transaction_id.is_empty() {
            return Err(AuthError::Validation(
                "transactionId must not be empty".to_string(),
            ));
        }
        Ok(tx)
    }
}

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Decision produced and published.
    Ack,
    /// Unparseable message, dead-lettered. Never redelivered.
    Reject,
    /// Publishing failed; the message is redelivered and the decision recomputed.
    Requeue,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub acked: usize,
    pub rejected: usize,
    pub requeued: usize,
    pub dropped: usize,
}

/// Feeds queue deliveries through the engine and publishes the decisions.
pub struct Consumer {
    engine: Arc<AuthorizationEngine>,
    publisher: PublisherRef,
    settings: ConsumerSettings,
}

impl Consumer {
    pub fn new(
        engine: Arc<AuthorizationEngine>,
        publisher: PublisherRef,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            engine,
            publisher,
            settings,
        }
    }

    /// Processes a single delivery and reports how it should be settled.
    pub async fn handle(&self, delivery: &Delivery) -> Settlement {
        let tx = match delivery.decode() {
            Ok(tx) => tx,
            Err(e) => {
                log::warn!(
                    "Dead-lettering malformed message on {}: {}",
                    self.settings.queue,
                    e
                );
                return Settlement::Reject;
            }
        };

        let decision = self.engine.authorize(&tx).await;
        match self
            .publisher
            .publish(&self.settings.exchange, &self.settings.routing_key, &decision)
            .await
        {
            Ok(()) => Settlement::Ack,
            Err(e) => {
                log::error!(
                    "Failed to publish decision for {}: {}",
                    decision.transaction_id(),
                    e
                );
                Settlement::Requeue
            }
        }
    }

    /// Drains `deliveries` one at a time.
    ///
    /// A requeued delivery is handed back immediately, up to
    /// `max_redeliveries` times, after which it is dropped.
    pub async fn run<I>(&self, deliveries: I) -> ConsumerStats
    where
        I: IntoIterator<Item = Result<Delivery>>,
    {
        let mut stats = ConsumerStats::default();
        log::info!("Waiting for authorization requests on {}", self.settings.queue);

        for item in deliveries {
            let delivery = match item {
                Ok(delivery) => delivery,
                Err(e) => {
                    log::error!("Error reading message: {}", e);
                    stats.rejected += 1;
                    continue;
                }
            };

            let mut redeliveries = 0;
            loop {
                match self.handle(&delivery).await {
                    Settlement::Ack => {
                        stats.acked += 1;
                        break;
                    }
                    Settlement::Reject => {
                        stats.rejected += 1;
                        break;
                    }
                    Settlement::Requeue => {
                        stats.requeued += 1;
                        if redeliveries >= self.settings.max_redeliveries {
                            log::error!(
                                "Dropping message after {} redeliveries",
                                redeliveries
                            );
                            stats.dropped += 1;
                            break;
                        }
                        redeliveries += 1;
                    }
                }
            }
        }

        log::info!(
            "Consumer finished: {} acked, {} rejected, {} requeued, {} dropped",
            stats.acked,
            stats.rejected,
            stats.requeued,
            stats.dropped
        );
        stats
    }
}
