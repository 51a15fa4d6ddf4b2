use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MetricRow {
    /// RFC 3339 sample time
    pub time: String,
    /// Raw hardware address of the tag
    pub tag_id: String,
    /// One of temperature, humidity, pressure, battery, ping
    pub metric: String,
    pub value: f64,
}

/// Metric table with a configurable name.
///
/// The name must be a plain SQL identifier, see [`is_identifier`].
#[derive(Clone)]
pub struct MetricTable {
    name: String,
}

impl MetricTable {
    pub fn new(name: &str) -> Option<Self> {
        is_identifier(name).then(|| Self {
            name: name.to_string(),
        })
    }
}

impl Table for MetricTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                "time" TEXT NOT NULL,
                "tag_id" TEXT NOT NULL,
                "metric" TEXT NOT NULL,
                "value" REAL NOT NULL
            );
            "#,
            self.name
        )
    }

    fn dispose(&self) -> String {
        format!(r#"DROP TABLE IF EXISTS "{}";"#, self.name)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the only table names ever interpolated into SQL
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
