use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::RelayBackend;
use crate::errors::BackendError;

/// Redis backend over a single multiplexed connection, cloned per command
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        tracing::info!("connected to redis relay backend");

        Ok(Self { connection })
    }
}

#[async_trait]
impl RelayBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, BackendError> {
        let mut connection = self.connection.clone();
        let reached: usize = connection.publish(channel, payload).await?;
        Ok(reached)
    }

    async fn set(&self, key: &str, payload: &str) -> Result<(), BackendError> {
        let mut connection = self.connection.clone();
        connection.set::<_, _, ()>(key, payload).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }
}
