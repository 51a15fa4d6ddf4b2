#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("Invalid metrics table name: {0:?}")]
    InvalidTable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
