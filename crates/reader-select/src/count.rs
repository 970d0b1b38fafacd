use reader_core::{Countable, Result, SelectQuery};
use reader_filter::FilterPredicate;
use std::fmt;

/// Count shape of a reader: the base query plus the filter, nothing else.
///
/// The predicate is applied when counting, so a filter that cannot be
/// translated fails the count rather than the reader construction.
#[derive(Debug, Clone)]
pub struct CountQuery<Q> {
    query: Q,
    predicate: Option<FilterPredicate>,
}

impl<Q: SelectQuery> CountQuery<Q> {
    /// Count shape over `query`, filtered by `predicate` when given
    pub fn new(query: Q, predicate: Option<FilterPredicate>) -> Self {
        Self { query, predicate }
    }

    /// The query `count()` will run
    pub fn build(&self) -> Result<Q> {
        let query = self.query.clone();
        match &self.predicate {
            Some(predicate) => query.and_where(predicate),
            None => Ok(query),
        }
    }
}

impl<Q: SelectQuery> Countable for CountQuery<Q> {
    fn count(&self) -> Result<u64> {
        self.build()?.count()
    }
}

impl<Q: SelectQuery> fmt::Display for CountQuery<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.build() {
            Ok(query) => write!(f, "{}", query),
            Err(err) => write!(f, "<{}>", err),
        }
    }
}
