//! Loose value helpers for declaration attributes that arrive untyped.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truthiness of a loosely typed attribute value.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Deserialize an optional flag, coercing any present value to a strict bool.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value.filter(|v| !v.is_null()).map(|v| truthy(&v)))
}

///
/// TESTS
///
