//! Operator tags of the built-in processors

pub const EQUALS: &str = "equals";
pub const IN: &str = "in";
pub const LIKE: &str = "like";
pub const GREATER_THAN: &str = "greaterThan";
pub const GREATER_THAN_OR_EQUAL: &str = "greaterThanOrEqual";
pub const LESS_THAN: &str = "lessThan";
pub const LESS_THAN_OR_EQUAL: &str = "lessThanOrEqual";
pub const ALL: &str = "all";
pub const ANY: &str = "any";
pub const NOT: &str = "not";
