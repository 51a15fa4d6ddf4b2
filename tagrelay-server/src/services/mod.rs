pub mod backends;

mod cache_service;
mod directory_service;
mod enrich_service;
mod metric_service;
mod reconcile_service;
mod relay_service;
mod scanner_service;

pub use backends::{MemoryBackend, RedisBackend, RelayBackend};
pub use cache_service::*;
pub use directory_service::*;
pub use enrich_service::*;
pub use metric_service::*;
pub use reconcile_service::*;
pub use relay_service::*;
pub use scanner_service::*;
