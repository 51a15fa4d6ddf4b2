pub mod backfill;
pub mod directory;
pub mod metric;
pub mod relay;
pub mod scanner;

pub use backfill::BackfillError;
pub use directory::DirectoryError;
pub use metric::MetricError;
pub use relay::{BackendError, RelayError};
pub use scanner::ScannerError;
