use reader_cache::CollectionIter;
use reader_core::{Result, SelectQuery};

/// Rows produced by [`SelectDataReader::iter`](crate::SelectDataReader::iter):
/// either replayed from the reader's cache or streamed from the engine.
pub enum ReaderIter<Q: SelectQuery> {
    Cached(CollectionIter<Q::Row>),
    Streaming(Q::Rows),
}

impl<Q: SelectQuery> ReaderIter<Q> {
    /// Whether rows are replayed from the reader's cache
    pub fn is_cached(&self) -> bool {
        matches!(self, ReaderIter::Cached(_))
    }
}

impl<Q: SelectQuery> Iterator for ReaderIter<Q> {
    type Item = Result<Q::Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ReaderIter::Cached(rows) => rows.next().map(Ok),
            ReaderIter::Streaming(rows) => rows.next(),
        }
    }
}
