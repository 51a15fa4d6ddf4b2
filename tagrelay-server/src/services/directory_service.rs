use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tagrelay_api::DeviceConfigEntry;

use crate::errors::DirectoryError;

/// Source of the configured devices and their display names
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Loads the full ordered device list; called on every reconciliation tick
    async fn load(&self) -> Result<Vec<DeviceConfigEntry>, DirectoryError>;
}

/// Device list kept in a JSON file, re-read on every load
pub struct JsonDeviceDirectory {
    path: PathBuf,
}

impl JsonDeviceDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DeviceDirectory for JsonDeviceDirectory {
    async fn load(&self) -> Result<Vec<DeviceConfigEntry>, DirectoryError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| DirectoryError::Read {
                path: self.path.clone(),
                source,
            })?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}
