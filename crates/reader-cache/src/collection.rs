//! Memoized result set

use crate::stats::CacheStats;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Materialized rows of one query shape.
///
/// `None` means not collected yet; an empty collection is a valid
/// collected state.
pub struct CachedCollection<R> {
    collection: RwLock<Option<Arc<Vec<R>>>>,
    stats: CacheStats,
}

impl<R> CachedCollection<R> {
    /// Empty cache, nothing collected yet
    pub fn new() -> Self {
        Self {
            collection: RwLock::new(None),
            stats: CacheStats::new(),
        }
    }

    /// The cached rows, if collected. Counts as a lookup in the stats.
    pub fn collection(&self) -> Option<Arc<Vec<R>>> {
        let collection = self.collection.read().clone();
        match collection {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        collection
    }

    /// Store rows and return the shared handle to them
    pub fn set_collection(&self, items: Vec<R>) -> Arc<Vec<R>> {
        let items = Arc::new(items);
        debug!("Cached collection of {} rows", items.len());
        *self.collection.write() = Some(Arc::clone(&items));
        self.stats.record_fill();
        items
    }

    /// Whether rows were stored, an empty collection included
    pub fn is_collected(&self) -> bool {
        self.collection.read().is_some()
    }

    /// Independent cache starting from the current contents.
    ///
    /// Rows stay shared behind their `Arc`; filling either cache afterwards
    /// does not affect the other. Statistics start from zero.
    pub fn snapshot(&self) -> Self {
        Self {
            collection: RwLock::new(self.collection.read().clone()),
            stats: CacheStats::new(),
        }
    }

    /// Fresh iterator over the cached rows, starting from the first one
    pub fn generator(&self) -> Option<CollectionIter<R>> {
        self.collection.read().clone().map(CollectionIter::new)
    }

    /// Lookup statistics of this cache object
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<R> Default for CachedCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for CachedCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCollection")
            .field("collected", &self.is_collected())
            .field(
                "rows",
                &self.collection.read().as_ref().map(|items| items.len()),
            )
            .finish()
    }
}

/// Iterator over a cached collection. Owns a handle to the rows, so it stays
/// valid after the cache it came from is replaced.
#[derive(Debug)]
pub struct CollectionIter<R> {
    items: Arc<Vec<R>>,
    pos: usize,
}

impl<R> CollectionIter<R> {
    /// Iterator positioned before the first row
    pub fn new(items: Arc<Vec<R>>) -> Self {
        Self { items, pos: 0 }
    }
}

impl<R: Clone> Iterator for CollectionIter<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let item = self.items.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<R: Clone> ExactSizeIterator for CollectionIter<R> {}
