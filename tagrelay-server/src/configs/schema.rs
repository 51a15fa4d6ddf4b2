use crate::models::Table;

pub struct SchemaManager {
    tables: Vec<Box<dyn Table + Send + Sync>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table + Send + Sync>>) -> Self {
        Self { tables }
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricTable;

    #[test]
    fn test_dispose_runs_in_reverse_order() {
        let manager = SchemaManager::new(vec![
            Box::new(MetricTable::new("first").unwrap()),
            Box::new(MetricTable::new("second").unwrap()),
        ]);

        assert_eq!(manager.table_names(), vec!["first", "second"]);

        let dispose = manager.dispose_schema();
        assert!(dispose[0].contains("\"second\""));
        assert!(dispose[1].contains("\"first\""));
    }
}
