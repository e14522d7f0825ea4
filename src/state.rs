use std::sync::Arc;

use time::UtcOffset;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::meals::repo::MealLedger;
use crate::relay::client::{FoodAnalyzer, LocalRelay, RelayClient};
use crate::relay::gateway::{ChatGateway, HttpGateway};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<RwLock<MealLedger>>,
    pub gateway: Arc<dyn ChatGateway>,
    pub analyzer: Arc<dyn FoodAnalyzer>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "using file store");
                Arc::new(FileStore::new(dir))
            }
            None => {
                warn!("STORAGE_DIR not set; meals will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };
        let ledger = MealLedger::load(store, ledger_offset(config.utc_offset));

        if config.ai.api_key.is_none() {
            warn!("AI_API_KEY not set; analysis endpoints will fail");
        }
        let gateway = Arc::new(HttpGateway::new(&config.ai)?) as Arc<dyn ChatGateway>;

        let analyzer: Arc<dyn FoodAnalyzer> = match &config.relay_base_url {
            Some(url) => {
                info!(%url, "using remote relay");
                Arc::new(RelayClient::new(url, config.ai.timeout_secs)?)
            }
            None => Arc::new(LocalRelay::new(gateway.clone())),
        };

        Ok(Self::from_parts(config, ledger, gateway, analyzer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        ledger: MealLedger,
        gateway: Arc<dyn ChatGateway>,
        analyzer: Arc<dyn FoodAnalyzer>,
    ) -> Self {
        Self {
            config,
            ledger: Arc::new(RwLock::new(ledger)),
            gateway,
            analyzer,
        }
    }
}

fn ledger_offset(configured: Option<UtcOffset>) -> UtcOffset {
    if let Some(offset) = configured {
        return offset;
    }
    UtcOffset::current_local_offset().unwrap_or_else(|e| {
        warn!(error = %e, "local offset unavailable; bucketing days in UTC");
        UtcOffset::UTC
    })
}

#[cfg(test)]
impl AppState {
    /// Seeded in-memory ledger and a gateway that has nothing to say.
    pub fn fake() -> Self {
        let store = Arc::new(MemoryStore::new());
        let ledger = MealLedger::load(store, UtcOffset::UTC);
        Self::fake_with(
            ledger,
            Arc::new(crate::relay::gateway::scripted::ScriptedGateway::default()),
        )
    }

    pub fn fake_with_gateway(gateway: Arc<dyn ChatGateway>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::fake_with(MealLedger::load(store, UtcOffset::UTC), gateway)
    }

    pub fn fake_with(ledger: MealLedger, gateway: Arc<dyn ChatGateway>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            storage_dir: None,
            utc_offset: Some(UtcOffset::UTC),
            ai: crate::config::AiConfig {
                gateway_url: "http://fake.local".into(),
                api_key: None,
                model: "test".into(),
                timeout_secs: 1,
            },
            relay_base_url: None,
        });
        let analyzer = Arc::new(LocalRelay::new(gateway.clone())) as Arc<dyn FoodAnalyzer>;
        Self::from_parts(config, ledger, gateway, analyzer)
    }
}
