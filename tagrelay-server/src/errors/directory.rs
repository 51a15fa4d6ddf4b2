use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to read device directory {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid device directory: {0}")]
    Parse(#[from] serde_json::Error),
}
