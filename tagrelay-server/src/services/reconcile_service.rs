use std::sync::Arc;
use std::time::Duration;

use tagrelay_api::{
    device_key, insert_key, normalize_id, now_millis, DeviceConfigEntry, DeviceState,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::errors::BackfillError;
use crate::services::{CacheService, DeviceDirectory, MetricSink, RelayService};

/// Outcome of one backfill pass
#[derive(Debug, Default)]
pub struct BackfillReport {
    /// Normalized ids republished under a sample key
    pub relayed: Vec<String>,
    /// Normalized ids with no stored state
    pub skipped: Vec<String>,
    /// Normalized ids whose stored state was unreadable, or whose republish or archive failed
    pub failed: Vec<(String, BackfillError)>,
}

impl BackfillReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Periodic config reload followed by a backfill of every configured device
pub struct ReconcileService {
    cache: Arc<CacheService>,
    relay: Arc<RelayService>,
    directory: Arc<dyn DeviceDirectory>,
    metrics: Arc<dyn MetricSink>,
    devices: RwLock<Vec<DeviceConfigEntry>>,
    period: Duration,
}

impl ReconcileService {
    pub fn new(
        cache: Arc<CacheService>,
        relay: Arc<RelayService>,
        directory: Arc<dyn DeviceDirectory>,
        metrics: Arc<dyn MetricSink>,
        period: Duration,
    ) -> Self {
        Self {
            cache,
            relay,
            directory,
            metrics,
            devices: RwLock::new(Vec::new()),
            period,
        }
    }

    /// Devices of the last successful reload
    pub async fn devices(&self) -> Vec<DeviceConfigEntry> {
        self.devices.read().await.clone()
    }

    /// Reloads the device directory into the cache.
    ///
    /// On failure the previous device list stays in effect. Returns the number of
    /// configured devices afterwards.
    pub async fn reload(&self) -> usize {
        tracing::info!("Reloading configs...");

        let entries = match self.directory.load().await {
            Ok(entries) => entries,
            Err(e) => {
                let devices = self.devices.read().await;
                tracing::error!(
                    "Failed to reload device directory, keeping {} devices: {}",
                    devices.len(),
                    e
                );
                return devices.len();
            }
        };

        for entry in &entries {
            if let Some(device) = self.cache.rename(&entry.id, &entry.display_name).await {
                tracing::info!("{}", device.summary());
            }
        }

        let count = entries.len();
        *self.devices.write().await = entries;
        count
    }

    /// Republishes the stored state of every configured device under a sample key
    pub async fn backfill(&self) -> BackfillReport {
        self.backfill_at(now_millis()).await
    }

    /// Backfill pass whose sample keys carry `timestamp` (epoch ms).
    ///
    /// A failing device is recorded in the report and the pass moves on. Metric rows
    /// keep the sampled record's own timestamp.
    pub async fn backfill_at(&self, timestamp: i64) -> BackfillReport {
        let devices = self.devices().await;
        let mut report = BackfillReport::default();

        for device in &devices {
            let normalized_id = normalize_id(&device.id);

            match self.backfill_device(&normalized_id, timestamp).await {
                Ok(true) => report.relayed.push(normalized_id),
                Ok(false) => {
                    tracing::warn!("No data found for: {}", device.display_name);
                    report.skipped.push(normalized_id);
                }
                Err(e) => {
                    tracing::error!("Failed to backfill {}: {}", device.display_name, e);
                    report.failed.push((normalized_id, e));
                }
            }
        }

        tracing::debug!(
            "backfill done: {} relayed, {} skipped, {} failed",
            report.relayed.len(),
            report.skipped.len(),
            report.failed.len()
        );

        report
    }

    async fn backfill_device(
        &self,
        normalized_id: &str,
        timestamp: i64,
    ) -> Result<bool, BackfillError> {
        let Some(payload) = self.relay.fetch(&device_key(normalized_id)).await? else {
            return Ok(false);
        };

        // Nothing is relayed for a payload that is not a device state
        let state: DeviceState = serde_json::from_str(&payload)?;

        self.relay
            .publish_and_store(&insert_key(timestamp, normalized_id), &payload)
            .await?;
        self.metrics.archive(&state).await?;

        Ok(true)
    }

    /// One scheduler tick: reload, then backfill
    pub async fn tick(&self) -> BackfillReport {
        self.reload().await;
        self.backfill().await
    }

    /// Spawns the scheduler; the first tick fires one period from now
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + service.period, service.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!("reconciliation every {:?}", service.period);

            loop {
                ticker.tick().await;

                let report = service.tick().await;
                if !report.is_clean() {
                    tracing::warn!("{} devices failed to backfill", report.failed.len());
                }
            }
        })
    }
}
