//! Select data reader
//!
//! Wraps a [`SelectQuery`](reader_core::SelectQuery) and adds filtering,
//! sorting, pagination and memoized reads on top of it.
//!
//! Every `with_*` call returns a new reader with caches of its own. Caches
//! whose inputs did not change start from a copy of the parent's contents;
//! the others start empty. Filling a cache never reaches another reader:
//!
//! | change       | rows cache | single-row cache | count cache |
//! |--------------|:----------:|:----------------:|:-----------:|
//! | limit/offset | reset      | kept             | kept        |
//! | sort         | reset      | reset            | kept        |
//! | filter       | reset      | reset            | reset       |
//! | processors   | reset      | reset            | reset       |
//!
//! # Example
//!
//! ```ignore
//! use reader_filter::FilterExpr;
//! use reader_select::SelectDataReader;
//!
//! let reader = SelectDataReader::new(query)?
//!     .with_filter(FilterExpr::equals("status", "active"))
//!     .with_limit(10);
//!
//! let total = reader.count()?;   // one COUNT, ignores the limit
//! let page = reader.read()?;     // one fetch, cached
//! let first = reader.read_one()?; // served from `page`
//! ```

pub mod config;
pub mod count;
pub mod iter;
pub mod reader;

pub use config::ReaderConfig;
pub use count::CountQuery;
pub use iter::ReaderIter;
pub use reader::SelectDataReader;
