use crate::domain::decision::AuthorizationDecision;
use crate::domain::ports::DecisionPublisher;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::Mutex;

/// Publishes decisions as JSON lines to any writer (e.g., Stdout).
///
/// Each decision is flushed before `publish` returns, so a successful
/// publish means the line left the process.
pub struct JsonLinesPublisher<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> DecisionPublisher for JsonLinesPublisher<W> {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        decision: &AuthorizationDecision,
    ) -> Result<()> {
        let line = serde_json::to_string(decision)?;
        let mut writer = self.writer.lock().await;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        log::debug!(
            "Published {} to {}/{}",
            decision.transaction_id(),
            exchange,
            routing_key
        );
        Ok(())
    }
}
