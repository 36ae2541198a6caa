use rpcforge_schema::field_map::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

///
/// Addition
/// loose attribute overrides attached to a descriptor or param spec
///

pub type Addition = Map<String, Value>;

///
/// AttrLookup
///
/// Attribute access shared by plain override maps and web fields, so the
/// adapter can read overrides without caring where they came from.
///

pub trait AttrLookup {
    fn lookup(&self, key: &str) -> Option<&Value>;

    /// Present and non-null attribute.
    fn present(&self, key: &str) -> Option<&Value> {
        self.lookup(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<String> {
        self.present(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl AttrLookup for Addition {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

///
/// BuiltinType
/// native scalar types of the declaring language
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinType {
    Bool,
    Float,
    Int,
    Str,
}

///
/// WebFieldKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WebFieldKind {
    Boolean,
    Float,
    Integer,
    List,
    Nested,
    String,
    Other,
}

impl WebFieldKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Boolean" => Self::Boolean,
            "Float" => Self::Float,
            "Integer" => Self::Integer,
            "List" => Self::List,
            "Nested" => Self::Nested,
            "String" => Self::String,
            _ => Self::Other,
        }
    }
}

///
/// WebField
///
/// A field object of the web-annotation library. List fields carry a
/// `container`, nested fields a `model` of sub-fields; everything else is
/// an attribute (`description`, `required`, `default`, `min`, ...).
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WebField {
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Box<TypeDescriptor>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<FieldMap<TypeDescriptor>>,

    #[serde(flatten)]
    pub attrs: Addition,
}

impl WebField {
    #[must_use]
    pub fn kind(&self) -> WebFieldKind {
        WebFieldKind::from_name(&self.field)
    }
}

impl AttrLookup for WebField {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }
}

///
/// TypeDescriptor
///
/// Any of the loosely typed shapes a type can be declared with: a string
/// literal (`"int"`), a native builtin, a web field object, or something
/// the adapter does not understand.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeDescriptor {
    Literal(String),
    Builtin { builtin: BuiltinType },
    Field(WebField),
    Other(Value),
}

impl TypeDescriptor {
    /// Parse a raw value; unknown shapes land in `Other`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self::Other(value.clone()))
    }

    #[must_use]
    pub fn literal(s: &str) -> Self {
        Self::Literal(s.to_string())
    }

    /// The descriptor's own attributes, when it has any.
    #[must_use]
    pub fn attrs(&self) -> Option<&dyn AttrLookup> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }
}

///
/// TESTS
///
