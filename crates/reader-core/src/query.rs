//! Contract a query engine has to satisfy to be wrapped by the reader.

use crate::condition::Condition;
use crate::error::Result;
use crate::sort::Sort;
use std::fmt::{Debug, Display};

/// Receives the conditions a [`Predicate`] produces
pub trait WhereBuilder {
    fn where_condition(&mut self, condition: Condition);
}

impl WhereBuilder for Vec<Condition> {
    fn where_condition(&mut self, condition: Condition) {
        self.push(condition);
    }
}

/// A deferred predicate the engine invokes with its own builder handle
pub trait Predicate: Debug {
    fn build(&self, builder: &mut dyn WhereBuilder) -> Result<()>;
}

pub trait Countable {
    fn count(&self) -> Result<u64>;
}

/// A cloneable select query.
///
/// Chaining methods consume the query and return the modified one; callers
/// clone first when they need to keep the unmodified query.
pub trait SelectQuery: Countable + Clone + Debug + Display {
    type Row: Clone;
    type Rows: Iterator<Item = Result<Self::Row>>;

    /// Whether `count()` can actually be answered by this query
    fn supports_count(&self) -> bool {
        true
    }

    /// Whether `offset()` / `limit()` are honored by this query
    fn supports_pagination(&self) -> bool {
        true
    }

    fn offset(self, offset: usize) -> Self;

    fn limit(self, limit: usize) -> Self;

    fn order_by(self, sort: &Sort) -> Self;

    fn and_where(self, predicate: &dyn Predicate) -> Result<Self>;

    fn fetch_all(&self) -> Result<Vec<Self::Row>>;

    /// Lazily stream rows
    fn iter(&self) -> Result<Self::Rows>;
}
