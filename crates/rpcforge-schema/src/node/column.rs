use crate::{types::ScalarKind, value::deserialize_flag};
use serde::{Deserialize, Serialize};

///
/// Column
/// ORM column metadata attached to a model field
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Column {
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_key: Option<bool>,

    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub nullable: Option<bool>,

    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub unique: Option<bool>,

    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub index: Option<bool>,

    /// Foreign key target, `table.column`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    /// Explicit column type name overriding the one derived from the field kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Column {
    // column_type
    #[must_use]
    pub fn column_type(&self, kind: Option<ScalarKind>) -> String {
        match (&self.type_name, kind) {
            (Some(name), _) => name.clone(),
            (None, Some(kind)) => kind.column_type().to_string(),
            (None, None) => ScalarKind::String.column_type().to_string(),
        }
    }

    #[must_use]
    pub fn foreign_target(&self) -> Option<&str> {
        self.foreign.as_deref().filter(|f| !f.is_empty())
    }
}

///
/// TESTS
///
