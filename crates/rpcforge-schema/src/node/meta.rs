use crate::{field_map::Fields, node::Entry};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ClassRef
/// a class addressed by its declaring module
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ClassRef {
    pub module: String,
    pub name: String,
}

impl ClassRef {
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

///
/// Namespace
/// web namespace a service class is mounted under
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Namespace {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub urls: Vec<String>,

    /// Path parameters shared by every route of the namespace.
    #[serde(default)]
    pub params: Fields,
}

///
/// MetaData
/// one service with its entries and bound implementation
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MetaData {
    pub name: String,
    pub service: ClassRef,
    pub entries: Vec<Entry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<ClassRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
}

impl MetaData {
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
