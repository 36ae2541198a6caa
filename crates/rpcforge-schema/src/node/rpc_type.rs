use crate::{
    field_map::Fields,
    node::Column,
    types::{ArgSource, ScalarKind},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Not;

///
/// RpcKind
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcKind {
    Void,
    Bool,
    Int,
    Float,
    String,
    List {
        elem: Box<RpcType>,
    },
    Dict {
        #[serde(default)]
        fields: Fields,
    },
    Enum {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        underlying: Box<RpcType>,
        members: Fields,
    },
}

///
/// Constraints
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_true: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_false: Option<bool>,
}

impl Constraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

///
/// RpcType
///
/// The canonical type every annotation scheme is normalized into.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RpcType {
    #[serde(flatten)]
    pub kind: RpcKind,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub required: bool,

    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(default, skip_serializing_if = "ArgSource::is_unknown")]
    pub source: ArgSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,

    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

impl RpcType {
    #[must_use]
    pub fn new(kind: RpcKind) -> Self {
        Self {
            kind,
            description: String::new(),
            required: false,
            default_value: None,
            source: ArgSource::Unknown,
            column: None,
            constraints: Constraints::default(),
        }
    }

    #[must_use]
    pub fn void() -> Self {
        Self::new(RpcKind::Void)
    }

    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(match kind {
            ScalarKind::Bool => RpcKind::Bool,
            ScalarKind::Float => RpcKind::Float,
            ScalarKind::Int => RpcKind::Int,
            ScalarKind::String => RpcKind::String,
        })
    }

    #[must_use]
    pub fn list(elem: Self) -> Self {
        Self::new(RpcKind::List {
            elem: Box::new(elem),
        })
    }

    #[must_use]
    pub fn dict(fields: Fields) -> Self {
        Self::new(RpcKind::Dict { fields })
    }

    #[must_use]
    pub fn enumeration(name: Option<String>, underlying: Self, members: Fields) -> Self {
        Self::new(RpcKind::Enum {
            name,
            underlying: Box::new(underlying),
            members,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default_value = Some(default);
        self
    }

    #[must_use]
    pub const fn with_source(mut self, source: ArgSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self.kind, RpcKind::Void)
    }

    /// True for the four scalar kinds.
    #[must_use]
    pub const fn is_base_type(&self) -> bool {
        matches!(
            self.kind,
            RpcKind::Bool | RpcKind::Int | RpcKind::Float | RpcKind::String
        )
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self.kind, RpcKind::List { .. })
    }

    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self.kind, RpcKind::Dict { .. })
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, RpcKind::Enum { .. })
    }

    /// Scalar kind of the value on the wire; enums report their underlying kind.
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match &self.kind {
            RpcKind::Bool => Some(ScalarKind::Bool),
            RpcKind::Int => Some(ScalarKind::Int),
            RpcKind::Float => Some(ScalarKind::Float),
            RpcKind::String => Some(ScalarKind::String),
            RpcKind::Enum { underlying, .. } => underlying.scalar_kind(),
            _ => None,
        }
    }

    #[must_use]
    pub fn elem(&self) -> Option<&Self> {
        match &self.kind {
            RpcKind::List { elem } => Some(elem),
            _ => None,
        }
    }

    #[must_use]
    pub const fn fields(&self) -> Option<&Fields> {
        match &self.kind {
            RpcKind::Dict { fields } => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            RpcKind::Void => "void",
            RpcKind::Bool => "bool",
            RpcKind::Int => "int",
            RpcKind::Float => "float",
            RpcKind::String => "string",
            RpcKind::List { .. } => "list",
            RpcKind::Dict { .. } => "dict",
            RpcKind::Enum { .. } => "enum",
        }
    }

    /// True when any field of a dict carries column metadata.
    #[must_use]
    pub fn has_columns(&self) -> bool {
        self.fields()
            .is_some_and(|fields| fields.values().any(|f| f.column.is_some()))
    }
}

///
/// TESTS
///
