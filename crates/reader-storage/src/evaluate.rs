//! Row-level evaluation of conditions with SQL three-valued logic
//!
//! `None` stands for UNKNOWN (a NULL or missing column took part in the
//! comparison). Only rows evaluating to `Some(true)` pass a filter.

use reader_core::{CompareOp, Condition, Row, Value};
use std::cmp::Ordering;

/// Evaluate one condition against a row; `None` is UNKNOWN
pub fn evaluate(condition: &Condition, row: &Row) -> Option<bool> {
    match condition {
        Condition::Compare { field, op, value } => {
            let ordering = row.get(field)?.partial_compare(value)?;
            Some(match op {
                CompareOp::Equal => ordering == Ordering::Equal,
                CompareOp::Greater => ordering == Ordering::Greater,
                CompareOp::GreaterEqual => ordering != Ordering::Less,
                CompareOp::Less => ordering == Ordering::Less,
                CompareOp::LessEqual => ordering != Ordering::Greater,
            })
        }
        Condition::In { field, values } => {
            let left = row.get(field)?;
            if left.is_null() {
                return None;
            }
            let mut unknown = false;
            for value in values {
                match left.partial_compare(value) {
                    Some(Ordering::Equal) => return Some(true),
                    Some(_) => {}
                    None => unknown |= value.is_null(),
                }
            }
            if unknown {
                None
            } else {
                Some(false)
            }
        }
        Condition::Like { field, pattern } => match row.get(field)? {
            Value::Null => None,
            Value::Utf8(text) => Some(like_match(pattern, text)),
            other => Some(like_match(pattern, &other.to_string())),
        },
        Condition::All(parts) => {
            let mut result = Some(true);
            for part in parts {
                match evaluate(part, row) {
                    Some(false) => return Some(false),
                    None => result = None,
                    Some(true) => {}
                }
            }
            result
        }
        Condition::Any(parts) => {
            let mut result = Some(false);
            for part in parts {
                match evaluate(part, row) {
                    Some(true) => return Some(true),
                    None => result = None,
                    Some(false) => {}
                }
            }
            result
        }
        Condition::Not(inner) => evaluate(inner, row).map(|b| !b),
    }
}

/// Whether a row passes every condition
pub fn matches(conditions: &[Condition], row: &Row) -> bool {
    conditions
        .iter()
        .all(|condition| evaluate(condition, row) == Some(true))
}

/// Case-insensitive SQL `LIKE`: `%` matches any run of characters, `_` exactly one
pub fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let t: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let (mut pi, mut ti) = (0, 0);
    // position of the last `%` and the text index it is currently absorbing up to
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((star, absorbed)) = backtrack {
            pi = star + 1;
            ti = absorbed + 1;
            backtrack = Some((star, absorbed + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '%')
}
