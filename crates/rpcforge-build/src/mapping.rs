//! Type-name tables for the wire descriptor, Python and web dialects.

use rpcforge_schema::{
    node::{RpcKind, RpcType},
    types::ScalarKind,
};
use serde_json::Value;

/// Wire scalar of a scalar kind.
#[must_use]
pub const fn wire_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::Float => "float",
        ScalarKind::Int => "int32",
        ScalarKind::String => "string",
    }
}

/// Wire scalar of a type; enums use their underlying scalar.
#[must_use]
pub fn wire_type(ty: &RpcType) -> Option<&'static str> {
    ty.scalar_kind().map(wire_scalar)
}

/// Scalar kind named by a wire scalar.
#[must_use]
pub fn scalar_from_wire(name: &str) -> Option<ScalarKind> {
    match name {
        "bool" => Some(ScalarKind::Bool),
        "float" | "double" => Some(ScalarKind::Float),
        "int32" | "int64" => Some(ScalarKind::Int),
        "string" => Some(ScalarKind::String),
        _ => None,
    }
}

/// Python annotation of a scalar kind.
#[must_use]
pub const fn python_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::Float => "float",
        ScalarKind::Int => "int",
        ScalarKind::String => "str",
    }
}

/// Python annotation of a type without a generated class.
#[must_use]
pub fn python_type(ty: &RpcType) -> &'static str {
    match &ty.kind {
        RpcKind::List { .. } => "list",
        RpcKind::Dict { .. } => "dict",
        _ => ty.scalar_kind().map_or("bool", python_scalar),
    }
}

/// Python literal for a type's default, falling back to the zero value.
#[must_use]
pub fn python_default(ty: &RpcType) -> String {
    if let Some(value) = ty.default_value.as_ref().filter(|v| !v.is_null()) {
        return match ty.scalar_kind() {
            // string defaults are quoted whatever their json form
            Some(ScalarKind::String) => match value {
                Value::String(s) => py_str(s),
                other => py_str(&other.to_string()),
            },
            _ => python_literal(value),
        };
    }

    match &ty.kind {
        RpcKind::List { .. } => "None".to_string(),
        RpcKind::Dict { .. } => "None".to_string(),
        _ => match ty.scalar_kind() {
            Some(ScalarKind::String) => "\"\"".to_string(),
            Some(ScalarKind::Int | ScalarKind::Float) => "0".to_string(),
            Some(ScalarKind::Bool) | None => "False".to_string(),
        },
    }
}

/// Render a json value as a Python literal.
#[must_use]
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => py_bool(*b).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => py_str(s),
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let items: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", py_str(k), python_literal(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

#[must_use]
pub const fn py_bool(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

/// Double-quoted Python string literal.
#[must_use]
pub fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');

    out
}

/// Web field constructor for a type.
#[must_use]
pub fn web_field(ty: &RpcType) -> &'static str {
    match &ty.kind {
        RpcKind::List { .. } => "fields.List",
        RpcKind::Dict { .. } => "fields.Nested",
        _ => match ty.scalar_kind() {
            Some(ScalarKind::Bool) => "fields.Boolean",
            Some(ScalarKind::Float) => "fields.Float",
            Some(ScalarKind::Int) => "fields.Integer",
            Some(ScalarKind::String) | None => "fields.String",
        },
    }
}

///
/// TESTS
///
