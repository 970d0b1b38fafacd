//! Engine-neutral predicate tree
//!
//! Filter processors produce a [`Condition`]; query engines consume it through
//! their [`WhereBuilder`](crate::WhereBuilder) and decide how to evaluate or render it.

use crate::types::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Equal => "=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
        };
        write!(f, "{}", op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
    /// SQL `LIKE` with `%` and `_` wildcards
    Like {
        field: String,
        pattern: String,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Comparison of `field` against a literal
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    fn fmt_group(f: &mut fmt::Formatter<'_>, parts: &[Condition], joiner: &str) -> fmt::Result {
        if parts.is_empty() {
            // neutral element of the group
            return match joiner {
                "AND" => write!(f, "1 = 1"),
                _ => write!(f, "1 = 0"),
            };
        }
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", joiner)?;
            }
            write!(f, "({})", part)?;
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { field, op, value } => write!(f, "{} {} {}", field, op, value),
            Condition::In { field, values } => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} IN ({})", field, list.join(", "))
            }
            Condition::Like { field, pattern } => {
                write!(f, "{} LIKE {}", field, Value::Utf8(pattern.clone()))
            }
            Condition::All(parts) => Self::fmt_group(f, parts, "AND"),
            Condition::Any(parts) => Self::fmt_group(f, parts, "OR"),
            Condition::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}
