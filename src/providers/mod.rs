pub mod caching;
pub mod combined;
pub mod exchange_rates;
pub mod fallback;
pub mod gold_api;
pub mod util;

// Re-export traits for providers to easily use cache
pub use crate::core::cache::Cache;
pub use crate::store::memory::MemoryCache;

use crate::core::currency::{RateTable, RateTableProvider};
use caching::CachingRateProvider;
use combined::CombinedRateProvider;
use std::sync::Arc;
use std::time::Duration;

/// Builds the cached rate source for a run.
///
/// Currencies and metals are cached under separate keys before being
/// joined. A failed metals fetch is therefore never stored as fresh, and the
/// next run asks the metals source again while reusing cached currencies.
pub fn cached_rate_source<C, M>(
    currencies: C,
    metals: Option<M>,
    cache: Arc<dyn Cache<String, RateTable>>,
    ttl: Option<Duration>,
) -> Box<dyn RateTableProvider>
where
    C: RateTableProvider + 'static,
    M: RateTableProvider + 'static,
{
    let currencies = CachingRateProvider::new(currencies, Arc::clone(&cache), ttl);
    match metals {
        Some(metals) => {
            let metals = CachingRateProvider::new(metals, cache, ttl).with_namespace("metals");
            Box::new(CombinedRateProvider::new(currencies, metals))
        }
        None => Box::new(currencies),
    }
}
