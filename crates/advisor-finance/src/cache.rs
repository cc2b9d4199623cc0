//! Caching layer for tool results

use cached::{Cached, TimedCache};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache key for a tool request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Ticker symbol or search query
    pub subject: String,
    /// Upstream endpoint or operation
    pub endpoint: String,
    /// Remaining parameters, serialized
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        subject: impl Into<String>,
        endpoint: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            subject: subject.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe TTL cache of JSON tool results
#[derive(Clone)]
pub struct ToolCache {
    cache: Arc<RwLock<TimedCache<CacheKey, Value>>>,
}

impl ToolCache {
    /// Create a new cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a live value
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value
    pub async fn insert(&self, key: CacheKey, value: Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value, or fetch and cache it
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(subject = %key.subject, endpoint = %key.endpoint, "Cache hit");
            return Ok(value);
        }

        debug!(subject = %key.subject, endpoint = %key.endpoint, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of entries, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clear all entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }
}

/// One cache per kind of data, each with its own TTL
#[derive(Clone)]
pub struct CacheManager {
    /// Stock prices
    pub quotes: ToolCache,
    /// Company information
    pub company: ToolCache,
    /// Web and news search results
    pub search: ToolCache,
}

impl CacheManager {
    /// Create a cache manager with the given TTLs
    pub fn new(quote_ttl: Duration, company_ttl: Duration, search_ttl: Duration) -> Self {
        Self {
            quotes: ToolCache::new(quote_ttl),
            company: ToolCache::new(company_ttl),
            search: ToolCache::new(search_ttl),
        }
    }

    /// Build from the advisor configuration
    pub fn from_config(config: &crate::config::FinanceConfig) -> Self {
        Self::new(
            config.cache_ttl_quote(),
            config.cache_ttl_company(),
            config.cache_ttl_search(),
        )
    }
}
