use crate::core::cache::Cache;
use crate::core::currency::{ANCHOR, RateTable, RateTableProvider};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Caches fetched rate tables.
///
/// Fresh tables expire after `ttl`. The last successful table is also kept
/// without expiry and served when the inner provider fails. Entries are
/// stored under `{namespace}:USD`, so several sources can share one cache.
pub struct CachingRateProvider<T: RateTableProvider> {
    inner: T,
    cache: Arc<dyn Cache<String, RateTable>>,
    ttl: Option<Duration>,
    namespace: String,
}

impl<T: RateTableProvider> CachingRateProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn Cache<String, RateTable>>, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            cache,
            ttl,
            namespace: "rates".to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    fn fresh_key(&self) -> String {
        format!("{}:{ANCHOR}", self.namespace)
    }

    fn last_known_key(&self) -> String {
        format!("{}:{ANCHOR}:last", self.namespace)
    }
}

#[async_trait]
impl<T: RateTableProvider> RateTableProvider for CachingRateProvider<T> {
    async fn fetch_rates(&self) -> Result<RateTable> {
        if let Some(cached) = self.cache.get(&self.fresh_key()).await {
            debug!("Cache hit for rate table");
            return Ok(cached);
        }
        debug!("Cache miss for rate table");

        match self.inner.fetch_rates().await {
            Ok(table) => {
                self.cache
                    .put(self.fresh_key(), table.clone(), self.ttl)
                    .await;
                self.cache
                    .put(self.last_known_key(), table.clone(), None)
                    .await;
                Ok(table)
            }
            Err(e) => match self.cache.get(&self.last_known_key()).await {
                Some(stale) => {
                    warn!("Failed to fetch rates, using last known table: {e}");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCache;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockInnerProvider {
        call_count: AtomicUsize,
        failing: AtomicBool,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RateTableProvider for &MockInnerProvider {
        async fn fetch_rates(&self) -> Result<RateTable> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("Service unavailable"));
            }
            Ok(RateTable::new().with_rate("EUR", call as f64 + 1.0))
        }
    }

    #[tokio::test]
    async fn test_caching_rate_provider() {
        let inner_provider = MockInnerProvider::new();
        let cache = Arc::new(MemoryCache::<String, RateTable>::new());
        let caching_provider = CachingRateProvider::new(&inner_provider, cache, None);

        // First call - should hit inner provider
        let first = caching_provider.fetch_rates().await.unwrap();
        assert_eq!(first.rate(&"EUR".parse().unwrap()), 2.0);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);

        // Second call - should be cached
        let second = caching_provider.fetch_rates().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_table_is_refetched() {
        let inner_provider = MockInnerProvider::new();
        let cache = Arc::new(MemoryCache::<String, RateTable>::new());
        let caching_provider =
            CachingRateProvider::new(&inner_provider, cache, Some(Duration::from_millis(10)));

        caching_provider.fetch_rates().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let refreshed = caching_provider.fetch_rates().await.unwrap();
        assert_eq!(refreshed.rate(&"EUR".parse().unwrap()), 3.0);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_table_served_on_failure() {
        let inner_provider = MockInnerProvider::new();
        let cache = Arc::new(MemoryCache::<String, RateTable>::new());
        let caching_provider =
            CachingRateProvider::new(&inner_provider, cache, Some(Duration::from_millis(10)));

        caching_provider.fetch_rates().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        inner_provider.failing.store(true, Ordering::SeqCst);

        let stale = caching_provider.fetch_rates().await.unwrap();
        assert_eq!(stale.rate(&"EUR".parse().unwrap()), 2.0);
    }

    #[tokio::test]
    async fn test_failure_without_history_is_an_error() {
        let inner_provider = MockInnerProvider::new();
        inner_provider.failing.store(true, Ordering::SeqCst);
        let cache = Arc::new(MemoryCache::<String, RateTable>::new());
        let caching_provider = CachingRateProvider::new(&inner_provider, cache, None);

        let result = caching_provider.fetch_rates().await;
        assert_eq!(result.unwrap_err().to_string(), "Service unavailable");
    }

    #[tokio::test]
    async fn test_namespaces_share_a_cache() {
        let first_provider = MockInnerProvider::new();
        let second_provider = MockInnerProvider::new();
        let cache: Arc<dyn Cache<String, RateTable>> =
            Arc::new(MemoryCache::<String, RateTable>::new());
        let rates = CachingRateProvider::new(&first_provider, Arc::clone(&cache), None);
        let metals = CachingRateProvider::new(&second_provider, Arc::clone(&cache), None)
            .with_namespace("metals");

        rates.fetch_rates().await.unwrap();
        metals.fetch_rates().await.unwrap();
        rates.fetch_rates().await.unwrap();
        metals.fetch_rates().await.unwrap();

        assert_eq!(first_provider.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_provider.call_count.load(Ordering::SeqCst), 1);
        assert!(cache.get(&"metals:USD".to_string()).await.is_some());
        assert!(cache.get(&"rates:USD:last".to_string()).await.is_some());
    }
}
