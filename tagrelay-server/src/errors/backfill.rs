use crate::errors::{MetricError, RelayError};

/// Failure of the backfill pass for a single device
#[derive(Debug, thiserror::Error)]
pub enum BackfillError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Stored payload is not a device state: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to archive metrics: {0}")]
    Archive(#[from] MetricError),
}
