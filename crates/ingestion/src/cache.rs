//! Time-bounded cache of query results.
//!
//! Wraps another `TenderSource` and keeps each filter selection's records for
//! a fixed time-to-live, so repeated renders of the same selection skip the
//! database round trip.

use crate::source::{FilterOptions, TenderSource};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tendly_core::config::CacheConfig;
use tendly_core::{Error, Result, TenderFilters, TenderRecord};
use tracing::debug;

struct CachedRecords {
    records: Vec<TenderRecord>,
    fetched_at: Instant,
}

/// Caching wrapper around a tender source.
pub struct CachedTenderSource<S> {
    inner: S,
    ttl: Duration,
    entries: DashMap<String, CachedRecords>,
}

impl<S: TenderSource> CachedTenderSource<S> {
    /// Create a new cache with the given time-to-live.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Create a cache from the cache section of the config.
    pub fn from_config(inner: S, config: &CacheConfig) -> Result<Self> {
        if config.ttl_seconds == 0 {
            return Err(Error::invalid_configuration(
                "cache.ttl_seconds must be positive",
            ));
        }
        Ok(Self::new(inner, Duration::from_secs(config.ttl_seconds)))
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached selections. Expired entries linger until the next
    /// miss evicts them.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, v| v.fetched_at.elapsed() < ttl);
    }

    fn cached(&self, key: &str) -> Option<Vec<TenderRecord>> {
        self.entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.records.clone())
    }
}

impl<S: TenderSource> TenderSource for CachedTenderSource<S> {
    fn fetch_filtered_records(&self, filters: &TenderFilters) -> Result<Vec<TenderRecord>> {
        let key = filters.cache_key()?;

        if let Some(records) = self.cached(&key) {
            debug!(records = records.len(), "tender cache hit");
            return Ok(records);
        }

        debug!("tender cache miss");
        let records = self.inner.fetch_filtered_records(filters)?;
        self.cleanup_expired();
        self.entries.insert(
            key,
            CachedRecords {
                records: records.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(records)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        self.inner.filter_options()
    }

    fn invalidate(&self) {
        self.entries.clear();
        self.inner.invalidate();
    }
}

/// Wrap `inner` in a cache when the config enables one.
pub fn cached_source<S>(inner: S, config: &CacheConfig) -> Result<Box<dyn TenderSource>>
where
    S: TenderSource + 'static,
{
    if !config.enabled {
        debug!("tender cache disabled");
        return Ok(Box::new(inner));
    }
    debug!(ttl_seconds = config.ttl_seconds, "tender cache enabled");
    Ok(Box::new(CachedTenderSource::from_config(inner, config)?))
}
