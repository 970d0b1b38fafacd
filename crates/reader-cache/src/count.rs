//! Memoized row count

use crate::stats::CacheStats;
use parking_lot::RwLock;
use reader_core::{Countable, Result};
use tracing::debug;

/// Count of one fixed query shape, computed at most once.
#[derive(Debug)]
pub struct CachedCount<C> {
    source: C,
    count: RwLock<Option<u64>>,
    stats: CacheStats,
}

impl<C: Countable> CachedCount<C> {
    /// Cache counting `source`, empty until the first `count()`
    pub fn new(source: C) -> Self {
        Self {
            source,
            count: RwLock::new(None),
            stats: CacheStats::new(),
        }
    }

    /// Cached count, running the source count on first use.
    ///
    /// A failed count leaves the cache empty.
    pub fn count(&self) -> Result<u64> {
        if let Some(count) = *self.count.read() {
            self.stats.record_hit();
            return Ok(count);
        }

        // Hold the write lock while counting so the source runs only once
        let mut slot = self.count.write();
        if let Some(count) = *slot {
            self.stats.record_hit();
            return Ok(count);
        }
        self.stats.record_miss();

        let count = self.source.count()?;
        debug!("Cached count: {}", count);
        *slot = Some(count);
        self.stats.record_fill();
        Ok(count)
    }

    /// Whether a count is stored
    pub fn is_cached(&self) -> bool {
        self.count.read().is_some()
    }

    /// The query shape this cache counts
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Lookup statistics of this cache object
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<C: Countable + Clone> CachedCount<C> {
    /// Independent cache over a copy of the source, starting from the current
    /// count. Statistics start from zero.
    pub fn snapshot(&self) -> Self {
        Self {
            source: self.source.clone(),
            count: RwLock::new(*self.count.read()),
            stats: CacheStats::new(),
        }
    }
}
