//! Lookup counters shared by the reader caches

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters of one cache object. Updated through `&self` so the
/// caches can record from behind a shared reference.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
}

impl CacheStats {
    /// Counters starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fill(&self) {
        self.fills.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing cached
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Times a result was stored
    pub fn fills(&self) -> u64 {
        self.fills.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            fills: self.fills(),
        }
    }
}

/// Plain copy of [`CacheStats`] taken at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub fills: u64,
}

impl StatsSnapshot {
    /// Hits plus misses
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups served from the cache, 0.0 when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses, {} fills ({:.0}% hit rate)",
            self.hits,
            self.misses,
            self.fills,
            self.hit_rate() * 100.0
        )
    }
}
