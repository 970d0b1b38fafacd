//! Single-shape result caches for the select data reader
//!
//! Unlike a keyed query cache, each cache object here memoizes the result of
//! exactly one query shape. Invalidation never clears a cache in place: the
//! owner replaces it with a fresh one. `snapshot()` gives a derived owner its
//! own cache that starts from the current contents, so no two owners ever
//! fill the same slot.
//!
//! # Features
//!
//! - **CachedCount**: runs the underlying count at most once
//! - **CachedCollection**: tri-state (not collected / empty / rows) result set
//!   with a restartable iterator view
//! - **Snapshots**: detached copies for derived owners
//! - **Statistics**: hits and misses per cache object
//!
//! # Example
//!
//! ```ignore
//! use reader_cache::CachedCollection;
//!
//! let cache = CachedCollection::new();
//! if cache.collection().is_none() {
//!     cache.set_collection(query.fetch_all()?);
//! }
//! for row in cache.generator().into_iter().flatten() {
//!     // ...
//! }
//! ```

pub mod collection;
pub mod count;
pub mod stats;

pub use collection::{CachedCollection, CollectionIter};
pub use count::CachedCount;
pub use stats::{CacheStats, StatsSnapshot};
