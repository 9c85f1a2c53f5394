//! Bound parameter -> JSON conversion utilities

use serde_json::json;

use crate::{Filter, Value};

/// Convert a bound parameter to serde_json::Value
///
/// Numbers are rendered as JSON strings to keep decimal precision; dates use
/// `YYYY-MM-DD`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Number(n) => serde_json::Value::String(n.to_string()),
        Value::Date(_) => serde_json::Value::String(value.to_string()),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Describe a compiled filter as `{"filter": ..., "sql": ..., "params": [...]}`
pub fn filter_to_json(filter: &Filter) -> serde_json::Value {
    let kind = match filter {
        Filter::All => "all",
        Filter::Nothing => "nothing",
        Filter::Where(_) => "where",
    };
    json!({
        "filter": kind,
        "sql": filter.sql(),
        "params": filter.params().iter().map(value_to_json).collect::<Vec<_>>(),
    })
}
