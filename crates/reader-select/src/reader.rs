//! Cacheable select data reader

use crate::config::ReaderConfig;
use crate::count::CountQuery;
use crate::iter::ReaderIter;
use reader_cache::{CachedCollection, CachedCount};
use reader_core::{ReaderError, Result, SelectQuery, Sort};
use reader_filter::{FilterExpr, FilterPredicate, FilterProcessor, ProcessorRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reader over a base select query.
///
/// The base query is never modified; every read builds a derived query from
/// a clone of it. Results are memoized per reader configuration, and every
/// reader owns its caches.
pub struct SelectDataReader<Q: SelectQuery> {
    /// The base query
    query: Q,
    limit: Option<usize>,
    offset: Option<usize>,
    sort: Option<Sort>,
    filter: Option<Arc<FilterExpr>>,
    processors: ProcessorRegistry,
    count_cache: CachedCount<CountQuery<Q>>,
    /// Rows of `read()`
    items_cache: CachedCollection<Q::Row>,
    /// Result of `read_one()`: empty when resolved to no row
    one_item_cache: CachedCollection<Q::Row>,
}

impl<Q: SelectQuery> SelectDataReader<Q> {
    /// Wrap a base query.
    ///
    /// Fails with [`ReaderError::InvalidArgument`] when the query cannot count
    /// or cannot paginate.
    pub fn new(query: Q) -> Result<Self> {
        if !query.supports_count() {
            return Err(ReaderError::InvalidArgument(
                "Query should support count".to_string(),
            ));
        }
        if !query.supports_pagination() {
            return Err(ReaderError::InvalidArgument(
                "Query should support pagination (offset and limit)".to_string(),
            ));
        }

        Ok(Self {
            count_cache: CachedCount::new(CountQuery::new(query.clone(), None)),
            query,
            limit: None,
            offset: None,
            sort: None,
            filter: None,
            processors: ProcessorRegistry::with_defaults(),
            items_cache: CachedCollection::new(),
            one_item_cache: CachedCollection::new(),
        })
    }

    /// Row limit of `read()`, `None` when unlimited
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Rows skipped before the first one read
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Current sort order
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Current filter expression
    pub fn filter(&self) -> Option<&FilterExpr> {
        self.filter.as_deref()
    }

    /// Processors the filter is translated with
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// The wrapped base query
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// New reader reading at most `limit` rows
    pub fn with_limit(&self, limit: usize) -> Self {
        let mut clone = self.clone();
        clone.set_limit(Some(limit));
        clone
    }

    /// New reader skipping the first `offset` rows
    pub fn with_offset(&self, offset: usize) -> Self {
        let mut clone = self.clone();
        clone.set_offset(Some(offset));
        clone
    }

    /// Set or clear (`None`) the sort order
    pub fn with_sort(&self, sort: impl Into<Option<Sort>>) -> Self {
        let mut clone = self.clone();
        clone.set_sort(sort.into());
        clone
    }

    /// New reader with `filter` replacing the current filter
    pub fn with_filter(&self, filter: FilterExpr) -> Self {
        let mut clone = self.clone();
        clone.set_filter(Some(filter));
        clone
    }

    /// Register additional processors.
    ///
    /// Processors are merged into the current registry: a processor replaces
    /// the one registered under the same tag, others are kept.
    pub fn with_filter_processors<I>(&self, processors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn FilterProcessor>>,
    {
        let mut clone = self.clone();
        clone.processors.extend(processors);
        clone.reset_count_cache();
        clone.items_cache = CachedCollection::new();
        clone.one_item_cache = CachedCollection::new();
        clone
    }

    /// Apply every setting of `config`; `None` fields clear the setting
    pub fn with_config(&self, config: ReaderConfig) -> Self {
        let mut clone = self.clone();
        clone.set_limit(config.limit);
        clone.set_offset(config.offset);
        clone.set_sort(config.sort);
        clone.set_filter(config.filter);
        clone
    }

    /// Current settings as a [`ReaderConfig`]
    pub fn config(&self) -> ReaderConfig {
        ReaderConfig {
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.clone(),
            filter: self.filter.as_deref().cloned(),
        }
    }

    /// Number of rows matching the filter; limit, offset and sort are ignored
    pub fn count(&self) -> Result<u64> {
        self.count_cache.count()
    }

    /// All rows of the derived query, fetched once and cached
    pub fn read(&self) -> Result<Arc<Vec<Q::Row>>> {
        if let Some(items) = self.items_cache.collection() {
            debug!("Serving {} rows from cache", items.len());
            return Ok(items);
        }

        let query = self.build_query()?;
        debug!("Reading rows: {}", query);
        let items = query.fetch_all()?;
        Ok(self.items_cache.set_collection(items))
    }

    /// First row of the derived query.
    ///
    /// Taken from the cached rows of `read()` when present, otherwise read
    /// with a limit of one. A `None` result is cached as well.
    pub fn read_one(&self) -> Result<Option<Q::Row>> {
        if let Some(one) = self.one_item_cache.collection() {
            return Ok(one.first().cloned());
        }

        let item = match self.items_cache.generator() {
            Some(mut items) => items.next(),
            None => {
                let query = self.derive_query(Some(1))?;
                debug!("Reading one row: {}", query);
                query.iter()?.next().transpose()?
            }
        };

        self.one_item_cache
            .set_collection(item.iter().cloned().collect());
        Ok(item)
    }

    /// Iterate rows without caching them.
    ///
    /// Replays the cached rows when `read()` already ran, otherwise streams
    /// straight from the engine.
    pub fn iter(&self) -> Result<ReaderIter<Q>> {
        if let Some(rows) = self.items_cache.generator() {
            return Ok(ReaderIter::Cached(rows));
        }

        let query = self.build_query()?;
        debug!("Streaming rows: {}", query);
        Ok(ReaderIter::Streaming(query.iter()?))
    }

    /// Textual form of the derived query, rebuilt on every call
    pub fn statement(&self) -> Result<String> {
        Ok(self.build_query()?.to_string())
    }

    /// Cache behind `count()`
    pub fn count_cache(&self) -> &CachedCount<CountQuery<Q>> {
        &self.count_cache
    }

    /// Cache behind `read()`
    pub fn items_cache(&self) -> &CachedCollection<Q::Row> {
        &self.items_cache
    }

    /// Cache behind `read_one()`
    pub fn one_item_cache(&self) -> &CachedCollection<Q::Row> {
        &self.one_item_cache
    }

    fn set_limit(&mut self, limit: Option<usize>) {
        if self.limit != limit {
            self.limit = limit;
            self.items_cache = CachedCollection::new();
        }
    }

    fn set_offset(&mut self, offset: Option<usize>) {
        if self.offset != offset {
            self.offset = offset;
            self.items_cache = CachedCollection::new();
        }
    }

    fn set_sort(&mut self, sort: Option<Sort>) {
        if self.sort != sort {
            self.sort = sort;
            self.items_cache = CachedCollection::new();
            self.one_item_cache = CachedCollection::new();
        }
    }

    fn set_filter(&mut self, filter: Option<FilterExpr>) {
        if self.filter.as_deref() != filter.as_ref() {
            self.filter = filter.map(Arc::new);
            self.items_cache = CachedCollection::new();
            self.one_item_cache = CachedCollection::new();
            self.reset_count_cache();
        }
    }

    fn reset_count_cache(&mut self) {
        let count_query = CountQuery::new(self.query.clone(), self.predicate());
        self.count_cache = CachedCount::new(count_query);
    }

    fn predicate(&self) -> Option<FilterPredicate> {
        self.filter
            .as_ref()
            .map(|filter| FilterPredicate::new(Arc::clone(filter), self.processors.clone()))
    }

    fn build_query(&self) -> Result<Q> {
        self.derive_query(self.limit)
    }

    fn derive_query(&self, limit: Option<usize>) -> Result<Q> {
        let mut query = self.query.clone();
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        if let Some(sort) = &self.sort {
            query = query.order_by(sort);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        if let Some(predicate) = self.predicate() {
            query = query.and_where(&predicate)?;
        }
        Ok(query)
    }
}

/// Settings are copied; each cache becomes an independent copy of its
/// current contents.
impl<Q: SelectQuery> Clone for SelectDataReader<Q> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            limit: self.limit,
            offset: self.offset,
            sort: self.sort.clone(),
            filter: self.filter.clone(),
            processors: self.processors.clone(),
            count_cache: self.count_cache.snapshot(),
            items_cache: self.items_cache.snapshot(),
            one_item_cache: self.one_item_cache.snapshot(),
        }
    }
}

impl<Q: SelectQuery> fmt::Debug for SelectDataReader<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectDataReader")
            .field("query", &self.query)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("sort", &self.sort)
            .field("filter", &self.filter.as_ref().map(|f| f.to_string()))
            .field("processors", &self.processors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use reader_core::{
        CompareOp, Condition, Countable, Predicate, Row, Value,
    };
    use reader_filter::{Not, Operand};
    use reader_storage::{MemoryQuery, MemoryRows};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine calls observed by [`CountingQuery`]
    #[derive(Debug, Default)]
    struct Calls {
        count: AtomicUsize,
        fetch: AtomicUsize,
        iter: AtomicUsize,
        statements: Mutex<Vec<String>>,
    }

    impl Calls {
        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }

        fn fetch(&self) -> usize {
            self.fetch.load(Ordering::SeqCst)
        }

        fn iter(&self) -> usize {
            self.iter.load(Ordering::SeqCst)
        }

        fn total(&self) -> usize {
            self.count() + self.fetch() + self.iter()
        }

        fn last_statement(&self) -> Option<String> {
            self.statements.lock().last().cloned()
        }
    }

    /// Memory query that records every execution
    #[derive(Debug, Clone)]
    struct CountingQuery {
        inner: MemoryQuery,
        calls: Arc<Calls>,
        countable: bool,
        paginable: bool,
    }

    impl CountingQuery {
        fn new(rows: Vec<Row>) -> Self {
            Self {
                inner: MemoryQuery::new("users", rows),
                calls: Arc::new(Calls::default()),
                countable: true,
                paginable: true,
            }
        }

        fn record(&self) {
            self.calls.statements.lock().push(self.inner.to_string());
        }
    }

    impl Countable for CountingQuery {
        fn count(&self) -> Result<u64> {
            self.calls.count.fetch_add(1, Ordering::SeqCst);
            self.record();
            self.inner.count()
        }
    }

    impl SelectQuery for CountingQuery {
        type Row = Row;
        type Rows = MemoryRows;

        fn supports_count(&self) -> bool {
            self.countable
        }

        fn supports_pagination(&self) -> bool {
            self.paginable
        }

        fn offset(mut self, offset: usize) -> Self {
            self.inner = self.inner.offset(offset);
            self
        }

        fn limit(mut self, limit: usize) -> Self {
            self.inner = self.inner.limit(limit);
            self
        }

        fn order_by(mut self, sort: &Sort) -> Self {
            self.inner = self.inner.order_by(sort);
            self
        }

        fn and_where(mut self, predicate: &dyn Predicate) -> Result<Self> {
            self.inner = self.inner.and_where(predicate)?;
            Ok(self)
        }

        fn fetch_all(&self) -> Result<Vec<Row>> {
            self.calls.fetch.fetch_add(1, Ordering::SeqCst);
            self.record();
            self.inner.fetch_all()
        }

        fn iter(&self) -> Result<MemoryRows> {
            self.calls.iter.fetch_add(1, Ordering::SeqCst);
            self.record();
            self.inner.iter()
        }
    }

    impl fmt::Display for CountingQuery {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.inner)
        }
    }

    fn user(id: i64, name: &str, status: &str) -> Row {
        Row::new()
            .with("id", id)
            .with("name", name)
            .with("status", status)
    }

    fn users() -> Vec<Row> {
        vec![
            user(1, "Alice", "active"),
            user(2, "Bob", "disabled"),
            user(3, "Carol", "active"),
            user(4, "Dave", "active"),
            user(5, "Eve", "disabled"),
        ]
    }

    fn create_reader() -> (SelectDataReader<CountingQuery>, Arc<Calls>) {
        let query = CountingQuery::new(users());
        let calls = Arc::clone(&query.calls);
        (SelectDataReader::new(query).unwrap(), calls)
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.get("id") {
                Some(Value::Int64(id)) => *id,
                other => panic!("unexpected id {:?}", other),
            })
            .collect()
    }

    fn id_of(row: &Option<Row>) -> Option<i64> {
        row.as_ref().map(|r| ids(std::slice::from_ref(r))[0])
    }

    /// `equals` that compares against the upper-cased value
    #[derive(Debug)]
    struct UpperEquals;

    impl FilterProcessor for UpperEquals {
        fn operator(&self) -> &str {
            "equals"
        }

        fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
            let field = operands[0].as_field().unwrap_or_default();
            let value = operands[1].as_field().unwrap_or_default().to_uppercase();
            Ok(Condition::compare(field, CompareOp::Equal, value))
        }
    }

    #[test]
    fn test_requires_count_capability() {
        let mut query = CountingQuery::new(users());
        query.countable = false;
        match SelectDataReader::new(query) {
            Err(ReaderError::InvalidArgument(msg)) => assert!(msg.contains("count")),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn test_requires_pagination_capability() {
        let mut query = CountingQuery::new(users());
        query.paginable = false;
        match SelectDataReader::new(query) {
            Err(ReaderError::InvalidArgument(msg)) => assert!(msg.contains("pagination")),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn test_read_all() {
        let (reader, calls) = create_reader();
        assert_eq!(ids(&reader.read().unwrap()), vec![1, 2, 3, 4, 5]);
        assert_eq!(reader.count().unwrap(), 5);
        assert_eq!(calls.fetch(), 1);
        assert_eq!(calls.count(), 1);
    }

    #[test]
    fn test_read_is_memoized() {
        let (reader, calls) = create_reader();
        let first = reader.read().unwrap();
        let second = reader.read().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.fetch(), 1);
        assert_eq!(reader.items_cache().stats().hits(), 1);
    }

    #[test]
    fn test_count_is_memoized() {
        let (reader, calls) = create_reader();
        let reader = reader.with_filter(FilterExpr::equals("status", "active"));
        assert_eq!(reader.count().unwrap(), 3);
        assert_eq!(reader.count().unwrap(), 3);
        assert_eq!(calls.count(), 1);
    }

    #[test]
    fn test_count_ignores_paging_and_sort() {
        let (reader, calls) = create_reader();
        let reader = reader
            .with_filter(FilterExpr::equals("status", "active"))
            .with_limit(1)
            .with_offset(1)
            .with_sort(Sort::new().desc("id"));

        assert_eq!(reader.count().unwrap(), 3);
        assert_eq!(
            calls.last_statement().unwrap(),
            "SELECT * FROM users WHERE status = 'active'"
        );
    }

    #[test]
    fn test_read_applies_settings() {
        let (reader, calls) = create_reader();
        let reader = reader
            .with_filter(FilterExpr::equals("status", "active"))
            .with_sort(Sort::new().desc("id"))
            .with_offset(1)
            .with_limit(1);

        assert_eq!(ids(&reader.read().unwrap()), vec![3]);
        assert_eq!(
            calls.last_statement().unwrap(),
            "SELECT * FROM users WHERE status = 'active' ORDER BY id DESC LIMIT 1 OFFSET 1"
        );
    }

    #[test]
    fn test_read_one_uses_limit_one() {
        let (reader, calls) = create_reader();
        let reader = reader.with_sort(Sort::new().desc("name"));

        assert_eq!(id_of(&reader.read_one().unwrap()), Some(5));
        assert_eq!(calls.iter(), 1);
        assert_eq!(
            calls.last_statement().unwrap(),
            "SELECT * FROM users ORDER BY name DESC LIMIT 1"
        );
        // limit of the reader itself is unchanged
        assert_eq!(reader.limit(), None);
    }

    #[test]
    fn test_read_one_is_memoized() {
        let (reader, calls) = create_reader();
        let first = reader.read_one().unwrap();
        let second = reader.read_one().unwrap();
        assert_eq!(first, second);
        assert_eq!(id_of(&first), Some(1));
        assert_eq!(calls.total(), 1);
    }

    #[test]
    fn test_read_one_memoizes_none() {
        let (reader, calls) = create_reader();
        let reader = reader.with_filter(FilterExpr::equals("status", "banned"));

        assert_eq!(reader.read_one().unwrap(), None);
        assert_eq!(reader.read_one().unwrap(), None);
        assert_eq!(calls.total(), 1);
        assert!(reader.one_item_cache().is_collected());
    }

    #[test]
    fn test_read_one_after_read_uses_cached_rows() {
        let (reader, calls) = create_reader();
        let reader = reader.with_sort(Sort::new().desc("id"));

        reader.read().unwrap();
        assert_eq!(calls.total(), 1);

        assert_eq!(id_of(&reader.read_one().unwrap()), Some(5));
        assert_eq!(calls.total(), 1);
    }

    #[test]
    fn test_read_one_after_empty_read() {
        let (reader, calls) = create_reader();
        let reader = reader.with_filter(FilterExpr::equals("status", "banned"));

        assert!(reader.read().unwrap().is_empty());
        assert_eq!(reader.read_one().unwrap(), None);
        assert_eq!(calls.total(), 1);
    }

    #[test]
    fn test_mutators_leave_receiver_unchanged() {
        let (reader, _) = create_reader();
        let reader = reader.with_limit(3);
        reader.read().unwrap();
        reader.read_one().unwrap();
        reader.count().unwrap();

        let derived = [
            reader.with_limit(2),
            reader.with_offset(1),
            reader.with_sort(Sort::new().desc("id")),
            reader.with_filter(FilterExpr::equals("status", "active")),
            reader.with_filter_processors([Arc::new(Not) as Arc<dyn FilterProcessor>]),
            reader.with_config(ReaderConfig::page(2, 2)),
        ];

        assert_eq!(derived[0].limit(), Some(2));
        assert_eq!(derived[5].offset(), Some(2));
        assert_eq!(reader.limit(), Some(3));
        assert_eq!(reader.offset(), None);
        assert!(reader.sort().is_none());
        assert!(reader.filter().is_none());
        assert!(!reader.processors().contains("not"));
        assert!(reader.items_cache().is_collected());
        assert!(reader.one_item_cache().is_collected());
        assert!(reader.count_cache().is_cached());
        assert_eq!(ids(&reader.read().unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn test_derived_reader_does_not_touch_parent_caches() {
        let (reader, _) = create_reader();
        let filtered = reader.with_filter(FilterExpr::equals("status", "active"));
        filtered.read().unwrap();
        filtered.read_one().unwrap();
        filtered.count().unwrap();

        assert!(!reader.items_cache().is_collected());
        assert!(!reader.one_item_cache().is_collected());
        assert!(!reader.count_cache().is_cached());
    }

    #[test]
    fn test_paged_child_read_one_stays_out_of_parent() {
        let (reader, _) = create_reader();
        let skipped = reader.with_offset(2);
        let empty_page = reader.with_limit(0);

        assert_eq!(id_of(&skipped.read_one().unwrap()), Some(3));
        assert!(empty_page.read().unwrap().is_empty());
        assert_eq!(empty_page.read_one().unwrap(), None);

        assert!(!reader.one_item_cache().is_collected());
        assert!(!reader.items_cache().is_collected());
        assert_eq!(id_of(&reader.read_one().unwrap()), Some(1));
        assert_eq!(reader.read().unwrap().len(), 5);

        // and the other way round
        assert_eq!(id_of(&skipped.read_one().unwrap()), Some(3));
        assert_eq!(empty_page.read_one().unwrap(), None);
    }

    #[test]
    fn test_child_keeps_filled_caches_but_fills_its_own() {
        let (reader, calls) = create_reader();
        let reader = reader.with_limit(2);
        reader.read_one().unwrap();
        reader.count().unwrap();
        let before = calls.total();

        // limit change keeps the single-row and count caches, as copies
        let wider = reader.with_limit(4);
        assert_eq!(id_of(&wider.read_one().unwrap()), Some(1));
        assert_eq!(wider.count().unwrap(), 5);
        assert_eq!(calls.total(), before);

        // the parent's empty rows cache stays empty when the child reads
        let narrower = reader.with_offset(1).with_sort(Sort::new().desc("id"));
        assert_eq!(ids(&narrower.read().unwrap()), vec![4, 3]);
        assert_eq!(id_of(&narrower.read_one().unwrap()), Some(4));
        assert!(!reader.items_cache().is_collected());
        assert_eq!(id_of(&reader.read_one().unwrap()), Some(1));
        assert_eq!(ids(&reader.read().unwrap()), vec![1, 2]);
    }

    /// Fill the parent reader's caches, derive, and report which
    /// caches the derived reader still has filled: (items, one, count)
    fn surviving_caches(
        derive: impl Fn(&SelectDataReader<CountingQuery>) -> SelectDataReader<CountingQuery>,
    ) -> (bool, bool, bool) {
        let (reader, _) = create_reader();
        reader.read().unwrap();
        reader.read_one().unwrap();
        reader.count().unwrap();

        let derived = derive(&reader);
        (
            derived.items_cache().is_collected(),
            derived.one_item_cache().is_collected(),
            derived.count_cache().is_cached(),
        )
    }

    #[test]
    fn test_limit_invalidates_only_rows() {
        assert_eq!(surviving_caches(|r| r.with_limit(2)), (false, true, true));
    }

    #[test]
    fn test_offset_invalidates_only_rows() {
        assert_eq!(surviving_caches(|r| r.with_offset(2)), (false, true, true));
    }

    #[test]
    fn test_sort_invalidates_rows_and_one() {
        assert_eq!(
            surviving_caches(|r| r.with_sort(Sort::new().asc("name"))),
            (false, false, true)
        );
    }

    #[test]
    fn test_filter_invalidates_everything() {
        assert_eq!(
            surviving_caches(|r| r.with_filter(FilterExpr::equals("status", "active"))),
            (false, false, false)
        );
    }

    #[test]
    fn test_processors_invalidate_everything() {
        assert_eq!(
            surviving_caches(|r| r.with_filter_processors([
                Arc::new(Not) as Arc<dyn FilterProcessor>
            ])),
            (false, false, false)
        );
    }

    #[test]
    fn test_unchanged_setting_keeps_caches() {
        let (reader, calls) = create_reader();
        let reader = reader
            .with_limit(2)
            .with_sort(Sort::new().asc("id"))
            .with_filter(FilterExpr::equals("status", "active"));
        reader.read().unwrap();
        reader.count().unwrap();

        let same = reader
            .with_limit(2)
            .with_sort(Sort::new().asc("id"))
            .with_filter(FilterExpr::equals("status", "active"));
        same.read().unwrap();
        same.count().unwrap();

        assert_eq!(calls.fetch(), 1);
        assert_eq!(calls.count(), 1);
    }

    #[test]
    fn test_filter_change_recounts() {
        let (reader, calls) = create_reader();
        assert_eq!(reader.count().unwrap(), 5);

        let active = reader.with_filter(FilterExpr::equals("status", "active"));
        assert_eq!(active.count().unwrap(), 3);
        assert_eq!(calls.count(), 2);

        // count cache survives paging changes
        assert_eq!(active.with_limit(1).count().unwrap(), 3);
        assert_eq!(calls.count(), 2);
    }

    #[test]
    fn test_filter_translation() {
        let (reader, _) = create_reader();

        let cases = [
            (
                r#"["equals", "status", "active"]"#,
                "SELECT * FROM users WHERE status = 'active'",
            ),
            (
                r#"["in", "id", [1, 2, 3]]"#,
                "SELECT * FROM users WHERE id IN (1, 2, 3)",
            ),
            (
                r#"["all", ["equals", "a", 1], ["equals", "b", 2]]"#,
                "SELECT * FROM users WHERE (a = 1) AND (b = 2)",
            ),
            (
                r#"["any", ["lessThan", "id", 2], ["greaterThanOrEqual", "id", 5]]"#,
                "SELECT * FROM users WHERE (id < 2) OR (id >= 5)",
            ),
            (
                r#"["like", "name", "ar"]"#,
                "SELECT * FROM users WHERE name LIKE '%ar%'",
            ),
        ];

        for (filter, expected) in cases {
            let filtered = reader.with_filter(FilterExpr::parse(filter).unwrap());
            assert_eq!(filtered.statement().unwrap(), expected);
        }
    }

    #[test]
    fn test_filtered_rows() {
        let (reader, _) = create_reader();

        let within = reader.with_filter(FilterExpr::in_list("id", [1, 2, 3]));
        assert_eq!(ids(&within.read().unwrap()), vec![1, 2, 3]);

        let both = reader.with_filter(FilterExpr::all([
            FilterExpr::equals("status", "active"),
            FilterExpr::greater_than("id", 1),
        ]));
        assert_eq!(ids(&both.read().unwrap()), vec![3, 4]);

        let like = reader.with_filter(FilterExpr::like("name", "AR"));
        assert_eq!(ids(&like.read().unwrap()), vec![3]);
    }

    #[test]
    fn test_unsupported_operator() {
        let (reader, calls) = create_reader();
        let reader = reader.with_filter(FilterExpr::new(
            "unknown_op",
            vec![Operand::from(Value::from("a"))],
        ));

        let errors = [
            reader.count().unwrap_err(),
            reader.read().unwrap_err(),
            reader.read_one().unwrap_err(),
            reader.statement().unwrap_err(),
            reader.iter().err().unwrap(),
        ];
        for err in &errors {
            assert!(matches!(err, ReaderError::UnsupportedOperator(_)));
            assert_eq!(err.operator(), Some("unknown_op"));
        }

        assert_eq!(calls.total(), 0);
        assert!(!reader.items_cache().is_collected());
        assert!(!reader.one_item_cache().is_collected());
        assert!(!reader.count_cache().is_cached());
    }

    #[test]
    fn test_iter_does_not_populate_cache() {
        let (reader, calls) = create_reader();
        let reader = reader.with_sort(Sort::new().desc("id")).with_limit(3);

        let iter = reader.iter().unwrap();
        assert!(!iter.is_cached());
        let streamed: Vec<Row> = iter.collect::<Result<_>>().unwrap();
        assert_eq!(ids(&streamed), vec![5, 4, 3]);
        assert!(!reader.items_cache().is_collected());
        assert_eq!(calls.iter(), 1);

        // read() still has to go to the engine
        let read = reader.read().unwrap();
        assert_eq!(calls.fetch(), 1);
        assert_eq!(streamed, *read);
    }

    #[test]
    fn test_iter_replays_cached_rows() {
        let (reader, calls) = create_reader();
        let read = reader.read().unwrap();

        let first = reader.iter().unwrap();
        assert!(first.is_cached());
        let replayed: Vec<Row> = first.collect::<Result<_>>().unwrap();
        let again: Vec<Row> = reader.iter().unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(replayed, *read);
        assert_eq!(again, *read);
        assert_eq!(calls.total(), 1);
    }

    #[test]
    fn test_iter_is_restartable() {
        let (reader, calls) = create_reader();
        let mut partial = reader.iter().unwrap();
        partial.next();

        let full: Vec<Row> = reader.iter().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(full.len(), 5);
        assert_eq!(calls.iter(), 2);
    }

    #[test]
    fn test_statement_is_rebuilt() {
        let (reader, calls) = create_reader();
        let reader = reader.with_limit(2);
        assert_eq!(reader.statement().unwrap(), "SELECT * FROM users LIMIT 2");
        assert_eq!(
            reader.with_offset(4).statement().unwrap(),
            "SELECT * FROM users LIMIT 2 OFFSET 4"
        );
        assert_eq!(calls.total(), 0);
    }

    #[test]
    fn test_filter_processors_are_additive() {
        let (reader, _) = create_reader();
        let reader = reader.with_filter_processors([Arc::new(Not) as Arc<dyn FilterProcessor>]);

        assert!(reader.processors().contains("not"));
        assert!(reader.processors().contains("equals"));

        let negated = reader.with_filter(FilterExpr::not(FilterExpr::equals("status", "active")));
        assert_eq!(ids(&negated.read().unwrap()), vec![2, 5]);
    }

    #[test]
    fn test_filter_processors_override() {
        let upper_rows = vec![user(1, "Alice", "ACTIVE"), user(2, "Bob", "active")];
        let reader = SelectDataReader::new(CountingQuery::new(upper_rows))
            .unwrap()
            .with_filter(FilterExpr::equals("status", "active"));
        assert_eq!(ids(&reader.read().unwrap()), vec![2]);

        let overridden =
            reader.with_filter_processors([Arc::new(UpperEquals) as Arc<dyn FilterProcessor>]);
        assert_eq!(ids(&overridden.read().unwrap()), vec![1]);
        assert_eq!(overridden.count().unwrap(), 1);

        // last registration wins, also across calls
        let restored = overridden
            .with_filter_processors([Arc::new(reader_filter::Equals) as Arc<dyn FilterProcessor>]);
        assert_eq!(ids(&restored.read().unwrap()), vec![2]);
        assert_eq!(reader.processors().len(), restored.processors().len());
    }

    #[test]
    fn test_with_config() {
        let (reader, _) = create_reader();
        let config = ReaderConfig::from_json(
            r#"{"limit": 2, "offset": 1, "sort": [["id", "desc"]], "filter": ["equals", "status", "active"]}"#,
        )
        .unwrap();

        let configured = reader.with_config(config.clone());
        assert_eq!(ids(&configured.read().unwrap()), vec![3, 1]);
        assert_eq!(configured.count().unwrap(), 3);
        assert_eq!(configured.config(), config);

        // an empty config clears everything again
        let cleared = configured.with_config(ReaderConfig::default());
        assert_eq!(ids(&cleared.read().unwrap()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_clear_sort() {
        let (reader, _) = create_reader();
        let sorted = reader.with_sort(Sort::parse("-id"));
        assert_eq!(id_of(&sorted.read_one().unwrap()), Some(5));

        let unsorted = sorted.with_sort(None);
        assert!(unsorted.sort().is_none());
        assert_eq!(id_of(&unsorted.read_one().unwrap()), Some(1));
    }
}
