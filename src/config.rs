//! Runtime settings consumed by the library.
//!
//! The binary builds these from command line flags and `JIT_*` environment
//! variables; tests build them directly.

use crate::domain::currency::SpreadSchedule;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_QUEUE: &str = "jit-funding-queue";
pub const DEFAULT_EXCHANGE: &str = "transactions";
pub const DEFAULT_ROUTING_KEY: &str = "jit-funding.decision";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Upper bound for any single cache or store call.
    pub store_timeout: Duration,
    /// Decisions slower than this are logged as warnings.
    pub slow_decision: Duration,
    pub blocked_groups: HashSet<String>,
    pub spreads: SpreadSchedule,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(50),
            slow_decision: Duration::from_millis(100),
            blocked_groups: HashSet::from(["Gambling".to_string()]),
            spreads: SpreadSchedule::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
    /// Times a requeued message is redelivered before it is dropped.
    pub max_redeliveries: u32,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            queue: DEFAULT_QUEUE.to_string(),
            exchange: DEFAULT_EXCHANGE.to_string(),
            routing_key: DEFAULT_ROUTING_KEY.to_string(),
            max_redeliveries: 3,
        }
    }
}

/// Seed files used to populate the in-memory stores.
#[derive(Debug, Clone, Default)]
pub struct SeedSettings {
    pub accounts: Option<PathBuf>,
    pub balances: Option<PathBuf>,
    pub rates: Option<PathBuf>,
    /// Copy seeded accounts into the cache as well as the durable store.
    pub warm_cache: bool,
    pub cache_ttl: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub consumer: ConsumerSettings,
    pub seed: SeedSettings,
    pub db_path: Option<PathBuf>,
    pub log_level: Option<log::LevelFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_topology() {
        let settings = Settings::default();
        assert_eq!(settings.consumer.queue, "jit-funding-queue");
        assert_eq!(settings.consumer.exchange, "transactions");
        assert_eq!(settings.consumer.routing_key, "jit-funding.decision");
        assert!(settings.engine.blocked_groups.contains("Gambling"));
        assert_eq!(settings.engine.slow_decision, Duration::from_millis(100));
    }
}
