//! In-memory select query
//!
//! Holds its rows behind an `Arc`, so cloning a query to derive a new one
//! never copies data.

use crate::batch::rows_from_batches;
use crate::evaluate::matches;
use arrow::record_batch::RecordBatch;
use reader_core::{
    Condition, Countable, Predicate, Result, Row, SelectQuery, Sort, SortDirection,
};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Select query over an in-memory table
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    table_name: String,
    rows: Arc<Vec<Row>>,
    conditions: Vec<Condition>,
    sort: Option<Sort>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl MemoryQuery {
    /// Create a query selecting every row of `rows`
    pub fn new(table_name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            table_name: table_name.into(),
            rows: Arc::new(rows),
            conditions: Vec::new(),
            sort: None,
            offset: None,
            limit: None,
        }
    }

    /// Create a query over Arrow record batches
    pub fn from_batches(table_name: impl Into<String>, batches: &[RecordBatch]) -> Result<Self> {
        Ok(Self::new(table_name, rows_from_batches(batches)?))
    }

    /// Name used in the rendered statement
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Conditions added through `and_where`
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Row positions in output order, before filtering and paging
    fn ordered_positions(&self) -> Option<Vec<usize>> {
        let sort = self.sort.as_ref().filter(|s| !s.is_empty())?;
        let mut positions: Vec<usize> = (0..self.rows.len()).collect();
        positions.sort_by(|&a, &b| compare_rows(&self.rows[a], &self.rows[b], sort));
        Some(positions)
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &Sort) -> Ordering {
    for (field, direction) in sort.order() {
        let ordering = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl Countable for MemoryQuery {
    /// Number of rows passing the conditions; offset and limit do not apply.
    fn count(&self) -> Result<u64> {
        let count = self
            .rows
            .iter()
            .filter(|row| matches(&self.conditions, row))
            .count();
        trace!("Counted {} rows in {}", count, self.table_name);
        Ok(count as u64)
    }
}

impl SelectQuery for MemoryQuery {
    type Row = Row;
    type Rows = MemoryRows;

    fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn order_by(mut self, sort: &Sort) -> Self {
        self.sort = Some(sort.clone());
        self
    }

    fn and_where(mut self, predicate: &dyn Predicate) -> Result<Self> {
        predicate.build(&mut self.conditions)?;
        Ok(self)
    }

    fn fetch_all(&self) -> Result<Vec<Row>> {
        self.iter()?.collect()
    }

    fn iter(&self) -> Result<MemoryRows> {
        Ok(MemoryRows {
            rows: Arc::clone(&self.rows),
            positions: self.ordered_positions(),
            conditions: self.conditions.clone(),
            cursor: 0,
            skip: self.offset.unwrap_or(0),
            remaining: self.limit,
        })
    }
}

impl fmt::Display for MemoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.table_name)?;
        match self.conditions.as_slice() {
            [] => {}
            [single] => write!(f, " WHERE {}", single)?,
            many => write!(f, " WHERE {}", Condition::All(many.to_vec()))?,
        }
        if let Some(sort) = self.sort.as_ref().filter(|s| !s.is_empty()) {
            write!(f, " ORDER BY {}", sort)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

/// Lazy row stream of a [`MemoryQuery`]: filters, skips and limits as it goes
#[derive(Debug)]
pub struct MemoryRows {
    rows: Arc<Vec<Row>>,
    positions: Option<Vec<usize>>,
    conditions: Vec<Condition>,
    cursor: usize,
    skip: usize,
    remaining: Option<usize>,
}

impl Iterator for MemoryRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            let position = match &self.positions {
                Some(positions) => *positions.get(self.cursor)?,
                None => self.cursor,
            };
            let row = self.rows.get(position)?;
            self.cursor += 1;

            if !matches(&self.conditions, row) {
                continue;
            }
            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some(Ok(row.clone()));
        }
    }
}
