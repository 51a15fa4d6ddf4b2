mod metric_row;

pub use metric_row::{MetricRow, MetricTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;
}
