//! The recursive filter expression sent with every query.
//!
//! On the wire a filter is a JSON array: either a predicate
//! `[field, operator, value]` or a combinator `["and" | "or", filter, ...]`.
//! A predicate's value can itself be a filter for relation fields, e.g.
//! `["vn", "=", ["id", "=", "v17"]]` selects characters of `v17`.
//!
//! The remote also accepts the compact string encoding it echoes back in
//! `compact_filters`; [`Filter::Compact`] carries that string through
//! untouched.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Operator {
    /// The operator as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// Parses a wire operator.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A literal: string, number, null, or an array such as `[2, 22]`.
    Literal(Value),
    /// A filter applied to a related entity.
    Nested(Box<Filter>),
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `[field, operator, value]`
    Predicate {
        /// Filter name as documented by the remote (`"id"`, `"search"`, ...).
        field: String,
        /// Comparison operator.
        op: Operator,
        /// Value compared against.
        value: FilterValue,
    },
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
    /// A pre-encoded compact filter string.
    Compact(String),
}

impl Filter {
    /// `[field, op, value]` with a literal value.
    pub fn predicate(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Filter::Predicate {
            field: field.into(),
            op,
            value: FilterValue::Literal(value.into()),
        }
    }

    /// `[field, op, filter]` for relation fields.
    pub fn nested(field: impl Into<String>, op: Operator, filter: Filter) -> Self {
        Filter::Predicate {
            field: field.into(),
            op,
            value: FilterValue::Nested(Box::new(filter)),
        }
    }

    /// `[field, "=", value]`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Eq, value)
    }

    /// `[field, "!=", value]`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Ne, value)
    }

    /// `[field, ">", value]`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Gt, value)
    }

    /// `[field, ">=", value]`
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Ge, value)
    }

    /// `[field, "<", value]`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Lt, value)
    }

    /// `[field, "<=", value]`
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Le, value)
    }

    /// `["id", "=", id]`
    pub fn id(id: impl Into<String>) -> Self {
        Self::eq("id", id.into())
    }

    /// `["search", "=", query]`
    pub fn search(query: impl Into<String>) -> Self {
        Self::eq("search", query.into())
    }

    /// `["and", ...]`
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// `["or", ...]`
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Encodes the filter as the JSON the remote expects.
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Predicate { field, op, value } => {
                let value = match value {
                    FilterValue::Literal(v) => v.clone(),
                    FilterValue::Nested(inner) => inner.to_json(),
                };
                Value::Array(vec![
                    Value::String(field.clone()),
                    Value::String(op.as_str().to_owned()),
                    value,
                ])
            }
            Filter::And(children) => combinator("and", children),
            Filter::Or(children) => combinator("or", children),
            Filter::Compact(s) => Value::String(s.clone()),
        }
    }

    /// Decodes a filter, e.g. the `normalized_filters` echo of a response.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(Filter::Compact(s.clone())),
            Value::Array(items) => {
                let head = items
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| "filter must start with a string".to_owned())?;
                match head {
                    "and" | "or" => {
                        let children = items[1..]
                            .iter()
                            .map(Filter::from_json)
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(if head == "and" {
                            Filter::And(children)
                        } else {
                            Filter::Or(children)
                        })
                    }
                    field => {
                        if items.len() != 3 {
                            return Err(format!(
                                "predicate on '{field}' must have 3 elements, got {}",
                                items.len()
                            ));
                        }
                        let op = items[1]
                            .as_str()
                            .and_then(Operator::parse)
                            .ok_or_else(|| format!("unknown operator in predicate on '{field}'"))?;
                        let value = if looks_like_filter(&items[2]) {
                            FilterValue::Nested(Box::new(Filter::from_json(&items[2])?))
                        } else {
                            FilterValue::Literal(items[2].clone())
                        };
                        Ok(Filter::Predicate {
                            field: field.to_owned(),
                            op,
                            value,
                        })
                    }
                }
            }
            other => Err(format!("filter must be an array or a string, got {other}")),
        }
    }
}

fn combinator(name: &str, children: &[Filter]) -> Value {
    let mut out = Vec::with_capacity(children.len() + 1);
    out.push(Value::String(name.to_owned()));
    out.extend(children.iter().map(Filter::to_json));
    Value::Array(out)
}

// Literal arrays such as `[2, 22]` or `["wikidata", 123]` never carry an
// operator in second position; nested filters always do.
fn looks_like_filter(value: &Value) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    match items.first().and_then(Value::as_str) {
        Some("and" | "or") => true,
        Some(_) => items.len() == 3 && items[1].as_str().and_then(Operator::parse).is_some(),
        None => false,
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Filter::from_json(&value).map_err(D::Error::custom)
    }
}
