use std::sync::Arc;

use tagrelay_api::{device_key, normalize_id, now_millis, DeviceState, Measurement};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::errors::RelayError;
use crate::services::{CacheService, RelayService};

/// Turns raw measurements into enriched device states and relays them
pub struct EnrichService {
    cache: Arc<CacheService>,
    relay: Arc<RelayService>,
}

impl EnrichService {
    pub fn new(cache: Arc<CacheService>, relay: Arc<RelayService>) -> Self {
        Self { cache, relay }
    }

    /// Processes a measurement stamped with the current wall clock
    pub async fn process(&self, measurement: &Measurement) -> Result<DeviceState, RelayError> {
        self.process_at(measurement, now_millis()).await
    }

    /// Processes a measurement that arrived at `timestamp` (epoch ms).
    ///
    /// The cache is updated before relaying, so a relay failure still advances
    /// the device's last-seen time.
    pub async fn process_at(
        &self,
        measurement: &Measurement,
        timestamp: i64,
    ) -> Result<DeviceState, RelayError> {
        let address = measurement.device_id.as_str();

        // A clock stepping backwards must not produce a negative ping
        let ping = self
            .cache
            .last_timestamp(address)
            .await
            .map(|last| (timestamp - last).max(0))
            .unwrap_or(0);
        let name = self.cache.display_name(address).await.unwrap_or_default();

        let stub = DeviceState::stub(measurement, timestamp, ping);
        let mut device = DeviceState::identity(address, &name);
        device.merge(&stub);

        self.cache.record_arrival(address, device.clone()).await;

        tracing::debug!(
            "{}[v{}] {} : {:?}",
            address,
            measurement.format_version,
            name,
            stub
        );

        self.relay
            .relay_state(&device_key(&normalize_id(address)), &device)
            .await?;

        Ok(device)
    }

    /// Consumes measurements one at a time until the sending side is dropped.
    ///
    /// Relay failures are logged per measurement and never stop the loop.
    pub async fn run(self: Arc<Self>, mut receiver: UnboundedReceiver<Measurement>) {
        tracing::info!("measurement loop started");

        while let Some(measurement) = receiver.recv().await {
            if let Err(e) = self.process(&measurement).await {
                tracing::error!("Failed to relay measurement of {}: {}", measurement.device_id, e);
            }
        }

        tracing::info!("measurement source closed, stopping measurement loop");
    }
}
