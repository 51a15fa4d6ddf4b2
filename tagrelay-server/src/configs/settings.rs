use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayBackendKind {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relay {
    pub backend: RelayBackendKind,
    /// e.g. `redis://:password@127.0.0.1:6379/0`
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub clean_start: bool,
    pub url: String,
    /// Table receiving one row per archived metric
    pub metrics_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    /// JSON array of `{ "id": ..., "name": ... }` entries
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scanner {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconcile {
    pub interval_secs: u64,
}

impl Reconcile {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub relay: Relay,
    pub database: Database,
    pub directory: Directory,
    pub scanner: Option<Scanner>,
    pub reconcile: Reconcile,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("TAGRELAY").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.directory.path = normalize_path(&settings.directory.path)
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .to_string_lossy()
            .to_string();

        Ok(settings)
    }
}
