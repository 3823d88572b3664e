//! TTL cache for loaded datasets so repeated report commands do not
//! re-read the workbook

use crate::loader::SpreadsheetLoader;
use delidash_common::{Result, SalesDataset};
use moka::future::Cache;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the dataset cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached datasets
    pub max_capacity: u64,
    /// Time-to-live for cache entries
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 8,
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl CacheConfig {
    pub fn from_settings(capacity: u64, ttl_seconds: u64) -> Self {
        Self {
            max_capacity: capacity,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }
}

/// Cache performance counters
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert(
            "invalidations".to_string(),
            self.invalidations.load(Ordering::Relaxed),
        );
        stats
    }
}

/// Cache of loaded datasets keyed by source path.
///
/// Keys compare literally, so two spellings of the same file cache
/// separately. Entries expire after the configured TTL; `invalidate`
/// drops a single path early when the workbook is known to have changed.
pub struct DatasetCache {
    cache: Cache<String, Arc<SalesDataset>>,
    loader: SpreadsheetLoader,
    metrics: Arc<CacheMetrics>,
}

impl DatasetCache {
    /// Create a cache that loads missing entries with the given loader
    pub fn new(loader: SpreadsheetLoader, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            cache,
            loader,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Return the cached dataset for `path`, loading it on a miss.
    ///
    /// Load failures are returned to the caller and nothing is cached,
    /// so the next call retries the load.
    #[instrument(skip(self, path))]
    pub async fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<SalesDataset>> {
        let key = cache_key(path.as_ref());

        if let Some(dataset) = self.cache.get(&key).await {
            debug!(key = %key, "dataset cache hit");
            self.metrics.record_hit();
            return Ok(dataset);
        }

        debug!(key = %key, "dataset cache miss");
        self.metrics.record_miss();
        let dataset = Arc::new(self.loader.load(path.as_ref())?);
        self.cache.insert(key, Arc::clone(&dataset)).await;
        Ok(dataset)
    }

    /// Drop the cached entry for a single path
    #[instrument(skip(self, path))]
    pub async fn invalidate(&self, path: impl AsRef<Path>) {
        let key = cache_key(path.as_ref());
        info!(key = %key, "invalidating cached dataset");
        self.cache.invalidate(&key).await;
        self.metrics.record_invalidation();
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        info!("invalidating all cached datasets");
        self.cache.invalidate_all();
        self.metrics.record_invalidation();
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn stats(&self) -> HashMap<String, u64> {
        let mut stats = self.metrics.get_stats();
        stats.insert("entry_count".to_string(), self.cache.entry_count());
        stats
    }
}

fn cache_key(path: &Path) -> String {
    path.display().to_string()
}
