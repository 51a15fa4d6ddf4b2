use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tagrelay_api::DeviceConfigEntry;
use tagrelay_server::configs::{Database, SchemaManager, Storage};
use tagrelay_server::errors::{BackendError, DirectoryError};
use tagrelay_server::models::MetricTable;
use tagrelay_server::services::{
    CacheService, DeviceDirectory, EnrichService, MemoryBackend, MetricStore, ReconcileService,
    RelayBackend, RelayService,
};

pub const METRICS_TABLE: &str = "ruuvitag_metrics";

/// Device list held in memory, editable between reloads
#[derive(Default)]
pub struct StaticDirectory {
    entries: RwLock<Vec<DeviceConfigEntry>>,
    broken: RwLock<bool>,
}

impl StaticDirectory {
    pub async fn set(&self, entries: &[(&str, &str)]) {
        *self.entries.write().await = entries
            .iter()
            .map(|(id, name)| DeviceConfigEntry {
                id: id.to_string(),
                display_name: name.to_string(),
            })
            .collect();
    }

    pub async fn set_broken(&self, broken: bool) {
        *self.broken.write().await = broken;
    }
}

#[async_trait]
impl DeviceDirectory for StaticDirectory {
    async fn load(&self) -> Result<Vec<DeviceConfigEntry>, DirectoryError> {
        if *self.broken.read().await {
            return Err(DirectoryError::Read {
                path: "static".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory unavailable"),
            });
        }

        Ok(self.entries.read().await.clone())
    }
}

/// Memory backend refusing to publish on channels containing one of the blocked ids
pub struct FlakyBackend {
    pub inner: MemoryBackend,
    blocked: RwLock<Vec<String>>,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            blocked: RwLock::new(Vec::new()),
        }
    }

    pub async fn block(&self, normalized_id: &str) {
        self.blocked.write().await.push(normalized_id.to_string());
    }
}

#[async_trait]
impl RelayBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, BackendError> {
        let blocked = self.blocked.read().await;
        if blocked.iter().any(|id| channel.ends_with(id.as_str())) {
            return Err(BackendError::Unavailable(format!("publish on {channel} refused")));
        }

        self.inner.publish(channel, payload).await
    }

    async fn set(&self, key: &str, payload: &str) -> Result<(), BackendError> {
        self.inner.set(key, payload).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.inner.get(key).await
    }
}

pub struct MockApp {
    pub backend: Arc<FlakyBackend>,
    pub storage: Arc<Storage>,
    pub metrics: Arc<MetricStore>,
    pub directory: Arc<StaticDirectory>,
    pub cache: Arc<CacheService>,
    pub relay: Arc<RelayService>,
    pub enricher: Arc<EnrichService>,
    pub reconciler: Arc<ReconcileService>,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                &Database {
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                    metrics_table: METRICS_TABLE.to_string(),
                },
                SchemaManager::new(vec![Box::new(MetricTable::new(METRICS_TABLE).unwrap())]),
            )
            .await
            .unwrap(),
        );

        let backend = Arc::new(FlakyBackend::new());
        let metrics = Arc::new(MetricStore::new(storage.clone(), METRICS_TABLE).unwrap());
        let directory = Arc::new(StaticDirectory::default());
        let cache = Arc::new(CacheService::new());
        let relay = Arc::new(RelayService::new(backend.clone()));
        let enricher = Arc::new(EnrichService::new(cache.clone(), relay.clone()));
        let reconciler = Arc::new(ReconcileService::new(
            cache.clone(),
            relay.clone(),
            directory.clone(),
            metrics.clone(),
            Duration::from_secs(60),
        ));

        Self {
            backend,
            storage,
            metrics,
            directory,
            cache,
            relay,
            enricher,
            reconciler,
        }
    }

    pub async fn with_devices(self, entries: &[(&str, &str)]) -> Self {
        self.directory.set(entries).await;
        self
    }
}
