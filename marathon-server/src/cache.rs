//! Caching layer for showtimes catalogs.
//!
//! A theater's schedule for a day changes rarely, but every form
//! interaction re-plans against it. We memoize the converted catalog per
//! (theater, date) so repeated searches over a cluster never reload or
//! reconvert the same document.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::warn;

use crate::catalog::{Catalog, CatalogError, CatalogProvider};
use crate::domain::TheaterCode;

/// Cache key for catalogs: (theater, date).
type CatalogKey = (TheaterCode, NaiveDate);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 256,
        }
    }
}

/// Catalog provider with memoization.
///
/// Wraps a `CatalogProvider` and caches converted catalogs. Failures are
/// not cached.
pub struct CachedCatalog<P> {
    provider: P,
    catalogs: MokaCache<CatalogKey, Arc<Catalog>>,
}

impl<P: CatalogProvider> CachedCatalog<P> {
    /// Create a new cached provider.
    pub fn new(provider: P, config: &CacheConfig) -> Self {
        let catalogs = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { provider, catalogs }
    }

    /// Get one theater's catalog, using the cache if available.
    pub async fn showtimes(
        &self,
        theater: &TheaterCode,
        date: NaiveDate,
    ) -> Result<Arc<Catalog>, CatalogError> {
        let key = (theater.clone(), date);

        // Try cache first
        if let Some(cached) = self.catalogs.get(&key).await {
            return Ok(cached);
        }

        let catalog = Arc::new(self.provider.showtimes(theater, date).await?);

        self.catalogs.insert(key, Arc::clone(&catalog)).await;

        Ok(catalog)
    }

    /// Load several theaters concurrently and merge them.
    ///
    /// Theaters that fail to load are logged and left out; the merged
    /// catalog is empty only if every theater failed or has nothing.
    pub async fn cluster_catalog(&self, theaters: &[TheaterCode], date: NaiveDate) -> Catalog {
        let results = join_all(theaters.iter().map(|t| self.showtimes(t, date))).await;

        let loaded = theaters
            .iter()
            .zip(results)
            .filter_map(|(theater, result)| match result {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    warn!(theater = %theater, %date, "skipping theater: {e}");
                    None
                }
            });

        Catalog::merge(loaded)
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.catalogs.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.catalogs.invalidate_all();
    }
}
