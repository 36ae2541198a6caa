use crate::{field_map::Fields, node::RpcType, types::IndexType};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

///
/// IndexDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,

    #[serde(default)]
    pub index_type: IndexType,
}

impl IndexDef {
    /// Declared name, or `ix_<table>_<columns>`.
    #[must_use]
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("ix_{table}_{}", self.columns.join("_")),
        }
    }
}

///
/// ModelDef
/// a declared data model; persisted when any field carries a column
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModelDef {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub fields: Fields,

    #[serde(default)]
    pub indexes: Vec<IndexDef>,
}

impl ModelDef {
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.fields.values().any(|f| f.column.is_some())
    }

    /// Fields that map to columns, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &RpcType)> {
        self.fields.iter().filter(|(_, f)| f.column.is_some())
    }
}

///
/// ModelWithVar
///
/// A model together with the variable and module that exported it.
/// Equality and hashing use the model name only.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModelWithVar {
    pub var_name: String,
    pub module_name: String,
    pub model: ModelDef,
}

impl ModelWithVar {
    #[must_use]
    pub fn new(
        var_name: impl Into<String>,
        module_name: impl Into<String>,
        model: ModelDef,
    ) -> Self {
        Self {
            var_name: var_name.into(),
            module_name: module_name.into(),
            model,
        }
    }

    /// Last segment of the declaring module, used to group output files.
    #[must_use]
    pub fn module_group(&self) -> &str {
        self.module_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.module_name)
    }
}

impl PartialEq for ModelWithVar {
    fn eq(&self, other: &Self) -> bool {
        self.model.name == other.model.name
    }
}

impl Eq for ModelWithVar {}

impl Hash for ModelWithVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model.name.hash(state);
    }
}

///
/// TESTS
///
