//! Built-in filter processors

use crate::expr::Operand;
use crate::operator;
use crate::processor::{FilterProcessor, ProcessorRegistry};
use reader_core::{CompareOp, Condition, ReaderError, Result, Value};

fn invalid(operator: &str, expected: &str) -> ReaderError {
    ReaderError::InvalidFilter(format!("\"{}\" expects {}", operator, expected))
}

/// Split `[field, value]` operands
fn field_and_value<'a>(operator: &str, operands: &'a [Operand]) -> Result<(&'a str, &'a Value)> {
    match operands {
        [field, value] => {
            let field = field
                .as_field()
                .ok_or_else(|| invalid(operator, "a field name as first operand"))?;
            let value = value
                .as_value()
                .ok_or_else(|| invalid(operator, "a scalar value as second operand"))?;
            Ok((field, value))
        }
        _ => Err(invalid(operator, "exactly two operands")),
    }
}

fn comparison(operator: &str, op: CompareOp, operands: &[Operand]) -> Result<Condition> {
    let (field, value) = field_and_value(operator, operands)?;
    Ok(Condition::compare(field, op, value.clone()))
}

/// Translate every operand as a nested filter
fn nested(operator: &str, operands: &[Operand], processors: &ProcessorRegistry) -> Result<Vec<Condition>> {
    if operands.is_empty() {
        return Err(invalid(operator, "at least one nested filter"));
    }
    operands
        .iter()
        .map(|operand| processors.translate(&operand.to_expr()?))
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Equals;

impl FilterProcessor for Equals {
    fn operator(&self) -> &str {
        operator::EQUALS
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        comparison(self.operator(), CompareOp::Equal, operands)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GreaterThan;

impl FilterProcessor for GreaterThan {
    fn operator(&self) -> &str {
        operator::GREATER_THAN
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        comparison(self.operator(), CompareOp::Greater, operands)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GreaterThanOrEqual;

impl FilterProcessor for GreaterThanOrEqual {
    fn operator(&self) -> &str {
        operator::GREATER_THAN_OR_EQUAL
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        comparison(self.operator(), CompareOp::GreaterEqual, operands)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LessThan;

impl FilterProcessor for LessThan {
    fn operator(&self) -> &str {
        operator::LESS_THAN
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        comparison(self.operator(), CompareOp::Less, operands)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LessThanOrEqual;

impl FilterProcessor for LessThanOrEqual {
    fn operator(&self) -> &str {
        operator::LESS_THAN_OR_EQUAL
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        comparison(self.operator(), CompareOp::LessEqual, operands)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct In;

impl FilterProcessor for In {
    fn operator(&self) -> &str {
        operator::IN
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        match operands {
            [field, values] => {
                let field = field
                    .as_field()
                    .ok_or_else(|| invalid(self.operator(), "a field name as first operand"))?;
                let values = values
                    .to_values()
                    .ok_or_else(|| invalid(self.operator(), "a list of scalar values"))?;
                Ok(Condition::In {
                    field: field.to_string(),
                    values,
                })
            }
            _ => Err(invalid(self.operator(), "exactly two operands")),
        }
    }
}

/// Substring match: the value is wrapped in `%` wildcards
#[derive(Debug, Default, Clone, Copy)]
pub struct Like;

impl FilterProcessor for Like {
    fn operator(&self) -> &str {
        operator::LIKE
    }

    fn condition(&self, operands: &[Operand], _: &ProcessorRegistry) -> Result<Condition> {
        let (field, value) = field_and_value(self.operator(), operands)?;
        let needle = match value {
            Value::Utf8(s) => s.clone(),
            Value::Null => return Err(invalid(self.operator(), "a non-null value")),
            other => other.to_string(),
        };
        Ok(Condition::Like {
            field: field.to_string(),
            pattern: format!("%{}%", needle),
        })
    }
}

/// Conjunction of nested filters
#[derive(Debug, Default, Clone, Copy)]
pub struct All;

impl FilterProcessor for All {
    fn operator(&self) -> &str {
        operator::ALL
    }

    fn condition(&self, operands: &[Operand], processors: &ProcessorRegistry) -> Result<Condition> {
        Ok(Condition::All(nested(self.operator(), operands, processors)?))
    }
}

/// Disjunction of nested filters
#[derive(Debug, Default, Clone, Copy)]
pub struct Any;

impl FilterProcessor for Any {
    fn operator(&self) -> &str {
        operator::ANY
    }

    fn condition(&self, operands: &[Operand], processors: &ProcessorRegistry) -> Result<Condition> {
        Ok(Condition::Any(nested(self.operator(), operands, processors)?))
    }
}

/// Negation of a single nested filter.
///
/// Not part of [`ProcessorRegistry::with_defaults`]; register it explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Not;

impl FilterProcessor for Not {
    fn operator(&self) -> &str {
        operator::NOT
    }

    fn condition(&self, operands: &[Operand], processors: &ProcessorRegistry) -> Result<Condition> {
        match operands {
            [inner] => {
                let condition = processors.translate(&inner.to_expr()?)?;
                Ok(Condition::Not(Box::new(condition)))
            }
            _ => Err(invalid(self.operator(), "exactly one nested filter")),
        }
    }
}
