pub mod schema;
pub mod settings;
pub mod storage;

use std::path::PathBuf;
use std::{env, io};

pub use schema::SchemaManager;
pub use settings::{
    Database, Directory, Logger, Reconcile, Relay, RelayBackendKind, Scanner, Settings,
};
pub use storage::Storage;

/// Resolves a relative path against the current working directory
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}
