use crate::{node::RpcType, types::ArgSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// Arg
/// one argument of an entry
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Arg {
    pub name: String,
    pub arg_type: RpcType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub source: ArgSource,
}

impl Arg {
    /// Build an argument whose metadata is taken from its type.
    #[must_use]
    pub fn new(name: impl Into<String>, arg_type: RpcType) -> Self {
        Self {
            name: name.into(),
            default: arg_type.default_value.clone(),
            description: arg_type.description.clone(),
            required: arg_type.required,
            source: arg_type.source,
            arg_type,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: ArgSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
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

    /// Argument type with the argument's own metadata folded back in.
    #[must_use]
    pub fn as_field(&self) -> RpcType {
        let mut ty = self.arg_type.clone();
        ty.description.clone_from(&self.description);
        ty.required = self.required;
        ty.default_value.clone_from(&self.default);
        ty.source = self.source;

        ty
    }
}
