use std::sync::Arc;

use anyhow::Context;

use crate::configs::{RelayBackendKind, SchemaManager, Settings, Storage};
use crate::models::MetricTable;
use crate::services::{
    CacheService, EnrichService, JsonDeviceDirectory, MemoryBackend, MetricStore, ReconcileService,
    RedisBackend, RelayBackend, RelayService,
};

/// Wired services of a running relay
pub struct App {
    pub relay: Arc<RelayService>,
    pub enricher: Arc<EnrichService>,
    pub reconciler: Arc<ReconcileService>,
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<App> {
    let backend: Arc<dyn RelayBackend> = match settings.relay.backend {
        RelayBackendKind::Redis => Arc::new(
            RedisBackend::connect(&settings.relay.url)
                .await
                .context("Failed to connect relay backend")?,
        ),
        RelayBackendKind::Memory => {
            tracing::warn!("using in-memory relay backend, nothing outlives the process");
            Arc::new(MemoryBackend::new())
        }
    };

    let table = MetricTable::new(&settings.database.metrics_table)
        .with_context(|| format!("Invalid metrics table {:?}", settings.database.metrics_table))?;
    let storage = Arc::new(
        Storage::new(&settings.database, SchemaManager::new(vec![Box::new(table)]))
            .await
            .context("Failed to open metric database")?,
    );

    let metrics = Arc::new(MetricStore::new(storage, &settings.database.metrics_table)?);
    let cache = Arc::new(CacheService::new());
    let relay = Arc::new(RelayService::new(backend));
    let enricher = Arc::new(EnrichService::new(cache.clone(), relay.clone()));
    let directory = Arc::new(JsonDeviceDirectory::new(&settings.directory.path));
    let reconciler = Arc::new(ReconcileService::new(
        cache,
        relay.clone(),
        directory,
        metrics,
        settings.reconcile.interval(),
    ));

    Ok(App {
        relay,
        enricher,
        reconciler,
    })
}
