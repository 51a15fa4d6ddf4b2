use std::sync::Arc;

use async_trait::async_trait;
use tagrelay_api::DeviceState;

use crate::configs::Storage;
use crate::errors::MetricError;
use crate::models::{MetricRow, MetricTable, Table};

/// Long-term metric rows, one per metric per archived reading
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn insert_metric_row(
        &self,
        timestamp: &str,
        device_id: &str,
        metric: &str,
        value: f64,
    ) -> Result<(), MetricError>;

    /// Writes temperature, humidity, pressure (hPa), battery (V) and ping (ms) rows,
    /// all stamped with the record's own `timestamp_iso`
    async fn archive(&self, state: &DeviceState) -> Result<(), MetricError>;
}

/// Metric names and values of a state, in archive order
pub fn metric_values(state: &DeviceState) -> [(&'static str, f64); 5] {
    [
        ("temperature", state.temperature),
        ("humidity", state.humidity),
        ("pressure", state.pressure_hpa),
        ("battery", state.battery_volts),
        ("ping", state.ping_millis as f64),
    ]
}

/// SQLite metric store; all values are bound parameters
pub struct MetricStore {
    storage: Arc<Storage>,
    insert_statement: String,
    select_statement: String,
}

impl MetricStore {
    pub fn new(storage: Arc<Storage>, table: &str) -> Result<Self, MetricError> {
        let table = MetricTable::new(table)
            .ok_or_else(|| MetricError::InvalidTable(table.to_string()))?;

        Ok(Self {
            storage,
            insert_statement: format!(
                r#"INSERT INTO "{}" ("time", "tag_id", "metric", "value") VALUES ($1, $2, $3, $4)"#,
                table.name()
            ),
            select_statement: format!(
                r#"SELECT "time", "tag_id", "metric", "value" FROM "{}"
                WHERE "tag_id" = $1 ORDER BY rowid ASC"#,
                table.name()
            ),
        })
    }

    // Get all rows of a tag in insertion order
    pub async fn find_by_tag(&self, tag_id: &str) -> Result<Vec<MetricRow>, MetricError> {
        let rows: Vec<MetricRow> = sqlx::query_as(&self.select_statement)
            .bind(tag_id)
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl MetricSink for MetricStore {
    async fn insert_metric_row(
        &self,
        timestamp: &str,
        device_id: &str,
        metric: &str,
        value: f64,
    ) -> Result<(), MetricError> {
        sqlx::query(&self.insert_statement)
            .bind(timestamp)
            .bind(device_id)
            .bind(metric)
            .bind(value)
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }

    async fn archive(&self, state: &DeviceState) -> Result<(), MetricError> {
        let timestamp = state.timestamp_iso.as_str();
        let mut transaction = self.storage.get_pool().begin().await?;

        for (metric, value) in metric_values(state) {
            sqlx::query(&self.insert_statement)
                .bind(timestamp)
                .bind(&state.id)
                .bind(metric)
                .bind(value)
                .execute(&mut *transaction)
                .await?;
        }

        transaction.commit().await?;

        tracing::debug!("archived metrics of {} at {}", state.id, timestamp);

        Ok(())
    }
}
