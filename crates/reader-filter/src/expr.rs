use crate::operator;
use reader_core::{ReaderError, Result, Value};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

/// One operand of a filter expression.
///
/// JSON arrays are kept as [`Operand::List`]; whether a list is a value list
/// or a nested expression is decided by the processor that consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Operand>),
    Expr(FilterExpr),
}

impl Operand {
    /// Scalar value, `None` for lists and nested filters
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Field reference: a string operand
    pub fn as_field(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Scalar list, if every item is a scalar
    pub fn to_values(&self) -> Option<Vec<Value>> {
        match self {
            Operand::List(items) => items.iter().map(|i| i.as_value().cloned()).collect(),
            _ => None,
        }
    }

    /// Interpret the operand as a nested expression
    pub fn to_expr(&self) -> Result<FilterExpr> {
        match self {
            Operand::Expr(expr) => Ok(expr.clone()),
            Operand::List(items) => match items.split_first() {
                Some((head, rest)) => match head.as_field() {
                    Some(tag) => Ok(FilterExpr::new(tag, rest.to_vec())),
                    None => Err(ReaderError::InvalidFilter(
                        "nested filter must start with an operator tag".to_string(),
                    )),
                },
                None => Err(ReaderError::InvalidFilter(
                    "nested filter must not be empty".to_string(),
                )),
            },
            Operand::Value(v) => Err(ReaderError::InvalidFilter(format!(
                "expected a nested filter, found {}",
                v
            ))),
        }
    }

    /// Convert a JSON operand; objects are rejected
    pub fn from_json(json: &Json) -> Result<Self> {
        Ok(match json {
            Json::Null => Operand::Value(Value::Null),
            Json::Bool(b) => Operand::Value(Value::Boolean(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Operand::Value(Value::Int64(i)),
                None => Operand::Value(Value::Float64(n.as_f64().unwrap_or(f64::NAN))),
            },
            Json::String(s) => Operand::Value(Value::Utf8(s.clone())),
            Json::Array(items) => Operand::List(
                items
                    .iter()
                    .map(Operand::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Json::Object(_) => {
                return Err(ReaderError::InvalidFilter(
                    "objects are not valid filter operands".to_string(),
                ))
            }
        })
    }

    /// JSON form of the operand
    pub fn to_json(&self) -> Json {
        match self {
            Operand::Value(Value::Null) => Json::Null,
            Operand::Value(Value::Boolean(b)) => Json::Bool(*b),
            Operand::Value(Value::Int64(i)) => Json::from(*i),
            Operand::Value(Value::Float64(f)) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Operand::Value(Value::Utf8(s)) => Json::String(s.clone()),
            Operand::List(items) => Json::Array(items.iter().map(Operand::to_json).collect()),
            Operand::Expr(expr) => expr.to_json(),
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<FilterExpr> for Operand {
    fn from(expr: FilterExpr) -> Self {
        Operand::Expr(expr)
    }
}

impl From<Vec<Value>> for Operand {
    fn from(values: Vec<Value>) -> Self {
        Operand::List(values.into_iter().map(Operand::Value).collect())
    }
}

/// Immutable tagged filter expression
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    tag: String,
    operands: Vec<Operand>,
}

impl FilterExpr {
    /// Expression with `tag` applied to `operands`
    pub fn new(tag: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            tag: tag.into(),
            operands,
        }
    }

    /// Operator tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Operands following the tag
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    fn binary(tag: &str, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(
            tag,
            vec![
                Operand::Value(Value::Utf8(field.into())),
                Operand::Value(value.into()),
            ],
        )
    }

    /// `["equals", field, value]`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(operator::EQUALS, field, value)
    }

    /// `["in", field, [values...]]`
    pub fn in_list<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(
            operator::IN,
            vec![Operand::Value(Value::Utf8(field.into())), values.into()],
        )
    }

    /// `["like", field, value]`, matched as a substring
    pub fn like(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::binary(operator::LIKE, field, value.into())
    }

    /// `["greaterThan", field, value]`
    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(operator::GREATER_THAN, field, value)
    }

    /// `["greaterThanOrEqual", field, value]`
    pub fn greater_than_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(operator::GREATER_THAN_OR_EQUAL, field, value)
    }

    /// `["lessThan", field, value]`
    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(operator::LESS_THAN, field, value)
    }

    /// `["lessThanOrEqual", field, value]`
    pub fn less_than_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(operator::LESS_THAN_OR_EQUAL, field, value)
    }

    /// Conjunction of `filters`
    pub fn all(filters: impl IntoIterator<Item = FilterExpr>) -> Self {
        Self::new(operator::ALL, filters.into_iter().map(Operand::Expr).collect())
    }

    /// Disjunction of `filters`
    pub fn any(filters: impl IntoIterator<Item = FilterExpr>) -> Self {
        Self::new(operator::ANY, filters.into_iter().map(Operand::Expr).collect())
    }

    /// Negation of `filter`; needs the `not` processor registered
    pub fn not(filter: FilterExpr) -> Self {
        Self::new(operator::NOT, vec![Operand::Expr(filter)])
    }

    /// Build from the wire form: a list whose first element is the tag
    pub fn from_json(json: &Json) -> Result<Self> {
        match Operand::from_json(json)? {
            list @ Operand::List(_) => list.to_expr(),
            _ => Err(ReaderError::InvalidFilter(
                "filter must be a list starting with an operator tag".to_string(),
            )),
        }
    }

    /// Wire form: the tag followed by the operands
    pub fn to_json(&self) -> Json {
        let mut items = Vec::with_capacity(self.operands.len() + 1);
        items.push(Json::String(self.tag.clone()));
        items.extend(self.operands.iter().map(Operand::to_json));
        Json::Array(items)
    }

    /// Parse the JSON wire form
    pub fn parse(s: &str) -> Result<Self> {
        let json: Json = serde_json::from_str(s)?;
        Self::from_json(&json)
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for FilterExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        FilterExpr::from_json(&json).map_err(D::Error::custom)
    }
}
