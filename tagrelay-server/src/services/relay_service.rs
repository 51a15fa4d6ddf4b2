use std::sync::Arc;

use tagrelay_api::DeviceState;

use crate::errors::RelayError;
use crate::services::backends::RelayBackend;

/// Publish-then-store delivery of device payloads.
///
/// Subscribers may observe a publish whose store write later fails; delivery to
/// subscribers takes precedence over persistence.
pub struct RelayService {
    backend: Arc<dyn RelayBackend>,
}

impl RelayService {
    pub fn new(backend: Arc<dyn RelayBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Publishes `payload` on channel `key`, then stores it at `key` without expiration.
    ///
    /// The store is skipped when the publish fails.
    pub async fn publish_and_store(&self, key: &str, payload: &str) -> Result<(), RelayError> {
        let reached = self
            .backend
            .publish(key, payload)
            .await
            .map_err(|source| RelayError::Publish {
                channel: key.to_string(),
                source,
            })?;

        self.backend
            .set(key, payload)
            .await
            .map_err(|source| RelayError::Store {
                key: key.to_string(),
                source,
            })?;

        tracing::trace!("relayed {} bytes on {} to {} subscribers", payload.len(), key, reached);

        Ok(())
    }

    /// Encodes the state as JSON and relays it under `key`
    pub async fn relay_state(&self, key: &str, state: &DeviceState) -> Result<(), RelayError> {
        let payload = serde_json::to_string(state)?;
        self.publish_and_store(key, &payload).await
    }

    /// Last stored payload at `key`
    pub async fn fetch(&self, key: &str) -> Result<Option<String>, RelayError> {
        self.backend
            .get(key)
            .await
            .map_err(|source| RelayError::Fetch {
                key: key.to_string(),
                source,
            })
    }
}
