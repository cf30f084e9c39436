use clap::Parser;
use jit_funding::application::consumer::Consumer;
use jit_funding::application::engine::AuthorizationEngine;
use jit_funding::bootstrap;
use jit_funding::config::{
    ConsumerSettings, DEFAULT_EXCHANGE, DEFAULT_QUEUE, DEFAULT_ROUTING_KEY, EngineSettings,
    SeedSettings, Settings,
};
use jit_funding::domain::currency::SpreadSchedule;
use jit_funding::domain::ports::DurableStoreRef;
use jit_funding::infrastructure::in_memory::{InMemoryCache, InMemoryStore};
use jit_funding::interfaces::stream::delivery_reader::DeliveryReader;
use jit_funding::interfaces::stream::json_publisher::JsonLinesPublisher;
use jit_funding::logging;
use log::LevelFilter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Inbound transaction messages, one JSON object per line. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Accounts seed CSV (id,status,preferred_currency,account_type)
    #[arg(long, env = "JIT_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Balances seed CSV (user_id,currency,balance)
    #[arg(long, env = "JIT_BALANCES")]
    balances: Option<PathBuf>,

    /// Exchange rate seed CSV (currency,rate)
    #[arg(long, env = "JIT_RATES")]
    rates: Option<PathBuf>,

    /// Also copy seeded accounts into the cache
    #[arg(long)]
    warm_cache: bool,

    /// Lifetime of seeded cache entries, in seconds. Entries never expire when omitted.
    #[arg(long, env = "JIT_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "JIT_DB_PATH")]
    db_path: Option<PathBuf>,

    #[arg(long, env = "JIT_QUEUE", default_value = DEFAULT_QUEUE)]
    queue: String,

    #[arg(long, env = "JIT_EXCHANGE", default_value = DEFAULT_EXCHANGE)]
    exchange: String,

    #[arg(long, env = "JIT_ROUTING_KEY", default_value = DEFAULT_ROUTING_KEY)]
    routing_key: String,

    /// Redeliveries of a message whose decision could not be published
    #[arg(long, env = "JIT_MAX_REDELIVERIES", default_value_t = 3)]
    max_redeliveries: u32,

    /// Upper bound for each cache or store call, in milliseconds
    #[arg(long, env = "JIT_STORE_TIMEOUT_MS", default_value_t = 50)]
    store_timeout_ms: u64,

    /// Decisions slower than this many milliseconds are logged
    #[arg(long, env = "JIT_SLOW_DECISION_MS", default_value_t = 100)]
    slow_decision_ms: u64,

    /// Merchant groups that are always declined (comma separated)
    #[arg(long = "blocked-group", env = "JIT_BLOCKED_GROUPS", value_delimiter = ',', default_value = "Gambling")]
    blocked_groups: Vec<String>,

    #[arg(long, env = "JIT_LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn into_settings(self) -> (Option<PathBuf>, Settings) {
        let settings = Settings {
            engine: EngineSettings {
                store_timeout: Duration::from_millis(self.store_timeout_ms),
                slow_decision: Duration::from_millis(self.slow_decision_ms),
                blocked_groups: self.blocked_groups.into_iter().collect(),
                spreads: SpreadSchedule::default(),
            },
            consumer: ConsumerSettings {
                queue: self.queue,
                exchange: self.exchange,
                routing_key: self.routing_key,
                max_redeliveries: self.max_redeliveries,
            },
            seed: SeedSettings {
                accounts: self.accounts,
                balances: self.balances,
                rates: self.rates,
                warm_cache: self.warm_cache,
                cache_ttl: self.cache_ttl_secs.map(Duration::from_secs),
            },
            db_path: self.db_path,
            log_level: Some(self.log_level),
        };
        (self.input, settings)
    }
}

async fn open_store(settings: &Settings, cache: &InMemoryCache) -> Result<DurableStoreRef> {
    #[cfg(feature = "storage-rocksdb")]
    {
        if let Some(db_path) = &settings.db_path {
            let store = jit_funding::infrastructure::rocksdb::RocksDBStore::open(db_path)
                .into_diagnostic()?;
            bootstrap::seed(&settings.seed, cache, &store)
                .await
                .into_diagnostic()?;
            return Ok(Arc::new(store));
        }
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    {
        if settings.db_path.is_some() {
            log::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    let store = InMemoryStore::new();
    bootstrap::seed(&settings.seed, cache, &store)
        .await
        .into_diagnostic()?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    let (input, settings) = Cli::parse().into_settings();
    logging::init(settings.log_level.unwrap_or(LevelFilter::Info)).into_diagnostic()?;

    let cache = InMemoryCache::new();
    let store = open_store(&settings, &cache).await?;

    let engine = Arc::new(AuthorizationEngine::new(
        Arc::new(cache),
        store,
        settings.engine.clone(),
    ));
    let publisher = Arc::new(JsonLinesPublisher::new(io::stdout()));
    let consumer = Consumer::new(engine, publisher, settings.consumer.clone());

    let source: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path).into_diagnostic()?)),
        None => Box::new(io::stdin().lock()),
    };
    consumer.run(DeliveryReader::new(source).deliveries()).await;

    Ok(())
}
