mod memory_backend;
mod redis_backend;

pub use memory_backend::MemoryBackend;
pub use redis_backend::RedisBackend;

use async_trait::async_trait;

use crate::errors::BackendError;

/// Pub/sub and key-value primitives the relay is built on
#[async_trait]
pub trait RelayBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &'static str;

    /// Publish a payload, returns the number of subscribers reached
    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, BackendError>;

    /// Store a payload without expiration
    async fn set(&self, key: &str, payload: &str) -> Result<(), BackendError>;

    /// Read a stored payload, `None` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
}
