//! Short-lived cache of search results keyed by normalized request

use crate::search::SearchRequest;
use crate::tools::search::SearchOutput;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe cache for search output
#[derive(Clone)]
pub struct SearchCache {
    cache: Arc<RwLock<TimedCache<SearchRequest, SearchOutput>>>,
}

impl SearchCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &SearchRequest) -> Option<SearchOutput> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: SearchRequest, value: SearchOutput) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// Only successful fetches are cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: SearchRequest,
        fetcher: F,
    ) -> Result<SearchOutput, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<SearchOutput, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for query: {}", key.query);
            return Ok(value);
        }

        tracing::debug!("Cache miss for query: {}", key.query);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Number of cached entries
    pub async fn size(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }
}
