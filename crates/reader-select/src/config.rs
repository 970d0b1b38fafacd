//! Reader configuration options

use reader_core::{Result, Sort};
use reader_filter::FilterExpr;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Paging, ordering and filtering settings of a reader.
///
/// Serializes to JSON such as:
///
/// ```text
/// {"limit": 20, "offset": 40, "sort": [["name", "asc"]], "filter": ["equals", "status", "active"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum number of rows to read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Number of rows to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpr>,
}

impl ReaderConfig {
    /// Empty configuration: no limit, offset, sort or filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Page `page` (1-based) of `page_size` rows; the offset saturates at `usize::MAX`
    pub fn page(page: usize, page_size: usize) -> Self {
        Self {
            limit: Some(page_size),
            offset: Some(page.saturating_sub(1).saturating_mul(page_size)),
            ..Default::default()
        }
    }

    /// Set the row limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of rows to skip
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the sort order
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the filter expression
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
