use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Ordered list of `(field, direction)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    order: Vec<(String, SortDirection)>,
}

impl Sort {
    /// Empty sort order
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ascending key
    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), SortDirection::Asc));
        self
    }

    /// Append a descending key
    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.order.push((field.into(), SortDirection::Desc));
        self
    }

    /// Parse an order string such as `"-created_at,name"`.
    ///
    /// A leading `-` means descending; blank items are skipped.
    pub fn parse(order: &str) -> Self {
        let order = order
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| match item.strip_prefix('-') {
                Some(field) => (field.to_string(), SortDirection::Desc),
                None => (item.to_string(), SortDirection::Asc),
            })
            .collect();
        Self { order }
    }

    /// Sort keys in priority order
    pub fn order(&self) -> &[(String, SortDirection)] {
        &self.order
    }

    /// Whether no key is set
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, direction)) in self.order.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field, direction)?;
        }
        Ok(())
    }
}
