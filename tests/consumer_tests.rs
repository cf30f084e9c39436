use jit_funding::application::consumer::{Consumer, ConsumerStats, Delivery, Settlement};
use jit_funding::config::ConsumerSettings;
use jit_funding::domain::decision::Reason;
use jit_funding::domain::ports::DecisionPublisher;
use jit_funding::error::Result;
use jit_funding::infrastructure::in_memory::{InMemoryCache, InMemoryPublisher};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::Ordering;

mod common;
use common::{FlakyPublisher, engine, funded_store};

const VALID: &str = r#"{"transactionId":"tx-1","userId":"u-1","cardId":"c-1","amount":12.5,"currency":"USD","merchantName":"STARBUCKS 0042","merchantCategory":"5814"}"#;

async fn consumer_with(publisher: Arc<dyn DecisionPublisher>) -> Consumer {
    let store = funded_store("u-1", "USD", dec!(100)).await;
    Consumer::new(
        Arc::new(engine(InMemoryCache::new(), store)),
        publisher,
        ConsumerSettings::default(),
    )
}

#[tokio::test]
async fn test_valid_message_is_published_and_acked() {
    let publisher = InMemoryPublisher::new();
    let consumer = consumer_with(Arc::new(publisher.clone())).await;

    let settlement = consumer.handle(&Delivery::new(VALID)).await;

    assert_eq!(settlement, Settlement::Ack);
    let published = publisher.published().await;
    assert_eq!(published.len(), 1);
    let (exchange, routing_key, decision) = &published[0];
    assert_eq!(exchange, "transactions");
    assert_eq!(routing_key, "jit-funding.decision");
    assert_eq!(decision.transaction_id(), "tx-1");
    assert_eq!(decision.reason(), Reason::Approved);
}

#[tokio::test]
async fn test_declines_are_published_and_acked_too() {
    let publisher = InMemoryPublisher::new();
    let consumer = consumer_with(Arc::new(publisher.clone())).await;
    let body = VALID.replace("\"u-1\"", "\"u-unknown\"");

    assert_eq!(consumer.handle(&Delivery::new(body)).await, Settlement::Ack);
    let decisions = publisher.decisions().await;
    assert_eq!(decisions[0].reason(), Reason::UserNotFound);
}

#[tokio::test]
async fn test_malformed_message_is_dead_lettered() {
    let publisher = InMemoryPublisher::new();
    let consumer = consumer_with(Arc::new(publisher.clone())).await;

    assert_eq!(
        consumer.handle(&Delivery::new("{\"transactionId\": 7")).await,
        Settlement::Reject
    );
    assert_eq!(
        consumer.handle(&Delivery::new(r#"{"transactionId":"tx-2","amount":"lots"}"#)).await,
        Settlement::Reject
    );
    assert!(publisher.published().await.is_empty());
}

#[tokio::test]
async fn test_publish_failure_requeues() {
    let publisher = Arc::new(FlakyPublisher::failing(1));
    let consumer = consumer_with(publisher.clone()).await;

    assert_eq!(consumer.handle(&Delivery::new(VALID)).await, Settlement::Requeue);
    assert_eq!(consumer.handle(&Delivery::new(VALID)).await, Settlement::Ack);
    assert_eq!(publisher.delivered.lock().await.len(), 1);
}

#[tokio::test]
async fn test_run_redelivers_then_acks() {
    let publisher = Arc::new(FlakyPublisher::failing(2));
    let consumer = consumer_with(publisher.clone()).await;

    let deliveries: Vec<Result<Delivery>> = vec![
        Ok(Delivery::new(VALID)),
        Ok(Delivery::new("garbage")),
    ];
    let stats = consumer.run(deliveries).await;

    assert_eq!(
        stats,
        ConsumerStats {
            acked: 1,
            rejected: 1,
            requeued: 2,
            dropped: 0
        }
    );
    assert_eq!(publisher.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_drops_after_max_redeliveries() {
    let publisher = Arc::new(FlakyPublisher::failing(usize::MAX));
    let store = funded_store("u-1", "USD", dec!(100)).await;
    let consumer = Consumer::new(
        Arc::new(engine(InMemoryCache::new(), store)),
        publisher.clone(),
        ConsumerSettings {
            max_redeliveries: 2,
            ..ConsumerSettings::default()
        },
    );

    let deliveries: Vec<Result<Delivery>> = vec![Ok(Delivery::new(VALID))];
    let stats = consumer.run(deliveries).await;

    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.requeued, 3);
    assert_eq!(stats.acked, 0);
    assert_eq!(publisher.attempts.load(Ordering::SeqCst), 3);
}
