pub mod condition;
pub mod error;
pub mod query;
pub mod sort;
pub mod types;

pub use condition::{CompareOp, Condition};
pub use error::{ReaderError, Result};
pub use query::{Countable, Predicate, SelectQuery, WhereBuilder};
pub use sort::{Sort, SortDirection};
pub use types::*;
