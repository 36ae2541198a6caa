use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// ArgSource
/// wire location an argument is read from
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
#[serde(rename_all = "snake_case")]
pub enum ArgSource {
    Body,
    Header,
    Params,
    Path,
    #[default]
    Unknown,
}

impl ArgSource {
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

///
/// ScalarKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Float,
    Int,
    String,
}

impl ScalarKind {
    /// Default ORM column type for the kind.
    #[must_use]
    pub const fn column_type(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Float => "Float",
            Self::Int => "Integer",
            Self::String => "String",
        }
    }
}

///
/// IndexType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexType {
    #[default]
    #[display("BTREE")]
    Btree,

    #[display("HASH")]
    Hash,
}
