use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::RelayBackend;
use crate::errors::BackendError;

/// In-process backend: one broadcast channel per pub/sub channel and a plain map as store
pub struct MemoryBackend {
    publishers: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            publishers: Arc::new(RwLock::new(HashMap::new())),
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let sender = {
            let mut publishers = self.publishers.write().await;
            publishers
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(100).0)
                .clone()
        };

        sender.subscribe()
    }

    /// Stored keys starting with `prefix`, sorted
    pub async fn keys(&self, prefix: &str) -> Vec<String> {
        let values = self.values.read().await;
        let mut keys: Vec<String> = values
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, BackendError> {
        let publishers = self.publishers.read().await;

        // Publishing without subscribers is not an error, as with Redis
        Ok(publishers
            .get(channel)
            .and_then(|sender| sender.send(payload.to_string()).ok())
            .unwrap_or(0))
    }

    async fn set(&self, key: &str, payload: &str) -> Result<(), BackendError> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }
}
