pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::currency::RateTable;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens the cache rate tables are kept in.
///
/// Prefers the on-disk cache under the configured data directory and falls
/// back to an in-memory cache when that cannot be opened.
pub fn open_rate_cache(config: &AppConfig) -> Arc<dyn Cache<String, RateTable>> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskCache::open(&path.join("cache"), "rates"));
    match disk {
        Ok(cache) => {
            debug!("Using on-disk rate cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Rate cache unavailable, rates will not persist: {e}");
            Arc::new(MemoryCache::new())
        }
    }
}
