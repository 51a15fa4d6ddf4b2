#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to encode device state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to publish on channel {channel}: {source}")]
    Publish {
        channel: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to store key {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to fetch key {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: BackendError,
    },
}
