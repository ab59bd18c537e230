//! Caching abstractions shared by the in-memory and on-disk stores.

use async_trait::async_trait;
use std::time::Duration;

/// A key-value cache whose entries may expire.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
    async fn remove(&self, key: &K);
    async fn clear(&self);
}
