//! Filter expressions and their translation into query conditions
//!
//! A filter is a tagged expression: an operator tag followed by operands. On the
//! wire it is a flat JSON list whose first element is the tag:
//!
//! ```text
//! ["all", ["equals", "status", "active"], ["in", "id", [1, 2, 3]]]
//! ```
//!
//! Each tag is handled by a [`FilterProcessor`] looked up in a
//! [`ProcessorRegistry`]. Composite processors (`all`, `any`, `not`) resolve
//! their nested expressions through the same registry, so user-registered
//! processors work at any depth.
//!
//! # Example
//!
//! ```ignore
//! use reader_filter::{FilterExpr, ProcessorRegistry};
//!
//! let filter = FilterExpr::parse(r#"["equals", "status", "active"]"#)?;
//! let condition = ProcessorRegistry::with_defaults().translate(&filter)?;
//! assert_eq!(condition.to_string(), "status = 'active'");
//! ```

pub mod expr;
pub mod operator;
pub mod predicate;
pub mod processor;
pub mod processors;

pub use expr::{FilterExpr, Operand};
pub use predicate::FilterPredicate;
pub use processor::{FilterProcessor, ProcessorRegistry};
pub use processors::{
    All, Any, Equals, GreaterThan, GreaterThanOrEqual, In, LessThan, LessThanOrEqual, Like, Not,
};
