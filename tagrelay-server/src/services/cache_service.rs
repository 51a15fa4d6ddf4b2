use std::collections::HashMap;
use std::sync::Arc;

use tagrelay_api::DeviceState;
use tokio::sync::RwLock;

/// Namespaced cache key; one namespace per kind of fact kept about a device.
///
/// All variants carry the raw (non-normalized) device id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    DisplayName(String),
    LastRecord(String),
    LastTimestamp(String),
}

/// Values are only ever stored under the key variant of the same name
#[derive(Debug, Clone)]
enum CacheValue {
    DisplayName(String),
    LastRecord(DeviceState),
    LastTimestamp(i64),
}

/// Process-lifetime device cache shared by the ingest loop and the reconciler.
///
/// Entries never expire and are never evicted.
#[derive(Default)]
pub struct CacheService {
    cache: Arc<RwLock<HashMap<CacheKey, CacheValue>>>,
}

impl CacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn display_name(&self, id: &str) -> Option<String> {
        let cache = self.cache.read().await;

        match cache.get(&CacheKey::DisplayName(id.to_string())) {
            Some(CacheValue::DisplayName(name)) => Some(name.clone()),
            _ => None,
        }
    }

    pub async fn last_record(&self, id: &str) -> Option<DeviceState> {
        let cache = self.cache.read().await;

        match cache.get(&CacheKey::LastRecord(id.to_string())) {
            Some(CacheValue::LastRecord(record)) => Some(record.clone()),
            _ => None,
        }
    }

    pub async fn last_timestamp(&self, id: &str) -> Option<i64> {
        let cache = self.cache.read().await;

        match cache.get(&CacheKey::LastTimestamp(id.to_string())) {
            Some(CacheValue::LastTimestamp(timestamp)) => Some(*timestamp),
            _ => None,
        }
    }

    pub async fn set_display_name(&self, id: &str, name: &str) {
        let mut cache = self.cache.write().await;
        cache.insert(
            CacheKey::DisplayName(id.to_string()),
            CacheValue::DisplayName(name.to_string()),
        );
    }

    pub async fn set_last_record(&self, id: &str, record: DeviceState) {
        let mut cache = self.cache.write().await;
        cache.insert(CacheKey::LastRecord(id.to_string()), CacheValue::LastRecord(record));
    }

    /// Stores the enriched record together with its arrival time under one lock
    pub async fn record_arrival(&self, id: &str, record: DeviceState) {
        let timestamp = record.timestamp_millis;

        let mut cache = self.cache.write().await;
        cache.insert(CacheKey::LastRecord(id.to_string()), CacheValue::LastRecord(record));
        cache.insert(
            CacheKey::LastTimestamp(id.to_string()),
            CacheValue::LastTimestamp(timestamp),
        );
    }

    /// Seeds or overwrites the display name and patches it into the cached record.
    ///
    /// Returns the patched record, if one was cached. Metrics are left untouched
    /// and an empty name never replaces a known one inside the record.
    pub async fn rename(&self, id: &str, name: &str) -> Option<DeviceState> {
        let mut cache = self.cache.write().await;
        cache.insert(
            CacheKey::DisplayName(id.to_string()),
            CacheValue::DisplayName(name.to_string()),
        );

        match cache.get_mut(&CacheKey::LastRecord(id.to_string())) {
            Some(CacheValue::LastRecord(record)) => {
                record.merge(&DeviceState {
                    display_name: name.to_string(),
                    ..Default::default()
                });
                Some(record.clone())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "AA:BB:CC:DD:EE:FF";

    fn record(temperature: f64, timestamp: i64) -> DeviceState {
        DeviceState {
            temperature,
            timestamp_millis: timestamp,
            ..DeviceState::identity(ID, "Kitchen")
        }
    }

    #[tokio::test]
    async fn test_miss_yields_none() {
        let cache = CacheService::new();

        assert_eq!(cache.display_name(ID).await, None);
        assert_eq!(cache.last_record(ID).await, None);
        assert_eq!(cache.last_timestamp(ID).await, None);
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let cache = CacheService::new();

        cache.set_display_name(ID, "Kitchen").await;
        assert_eq!(cache.display_name(ID).await.as_deref(), Some("Kitchen"));
        assert_eq!(cache.last_record(ID).await, None);
        assert_eq!(cache.last_timestamp(ID).await, None);

        // A record alone does not count as an arrival
        cache.set_last_record(ID, record(19.5, 1000)).await;
        assert_eq!(cache.last_timestamp(ID).await, None);
        assert_eq!(cache.display_name(ID).await.as_deref(), Some("Kitchen"));
    }

    #[tokio::test]
    async fn test_record_arrival_sets_record_and_timestamp() {
        let cache = CacheService::new();

        cache.record_arrival(ID, record(21.0, 1000)).await;

        assert_eq!(cache.last_timestamp(ID).await, Some(1000));
        assert_eq!(cache.last_record(ID).await.unwrap().temperature, 21.0);

        cache.record_arrival(ID, record(22.0, 2500)).await;

        assert_eq!(cache.last_timestamp(ID).await, Some(2500));
        assert_eq!(cache.last_record(ID).await.unwrap().temperature, 22.0);
    }

    #[tokio::test]
    async fn test_rename_patches_only_the_name() {
        let cache = CacheService::new();
        cache.set_last_record(ID, record(19.5, 1000)).await;

        let patched = cache.rename(ID, "Pantry").await.unwrap();

        assert_eq!(patched.display_name, "Pantry");
        assert_eq!(patched.temperature, 19.5);
        assert_eq!(patched.timestamp_millis, 1000);
        assert_eq!(cache.display_name(ID).await.as_deref(), Some("Pantry"));
        assert_eq!(cache.last_record(ID).await, Some(patched));
    }

    #[tokio::test]
    async fn test_rename_with_empty_name_keeps_record_name() {
        let cache = CacheService::new();
        cache.set_last_record(ID, record(19.5, 1000)).await;

        let patched = cache.rename(ID, "").await.unwrap();

        assert_eq!(patched.display_name, "Kitchen");
    }

    #[tokio::test]
    async fn test_rename_without_record_only_seeds_name() {
        let cache = CacheService::new();

        assert_eq!(cache.rename(ID, "Sauna").await, None);
        assert_eq!(cache.display_name(ID).await.as_deref(), Some("Sauna"));
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache = Arc::new(CacheService::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let id = format!("device-{i}");
                    cache.set_display_name(&id, "name").await;
                    cache.record_arrival(&id, record(20.0, i)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..16 {
            let id = format!("device-{i}");
            assert_eq!(cache.display_name(&id).await.as_deref(), Some("name"));
            assert_eq!(cache.last_timestamp(&id).await, Some(i));
        }
    }
}
