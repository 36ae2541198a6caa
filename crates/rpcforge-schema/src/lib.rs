pub mod error;
pub mod field_map;
pub mod naming;
pub mod node;
pub mod types;
pub mod validate;
pub mod value;

/// Maximum depth of the module graph walked by the scanner.
pub const MAX_SCAN_DEPTH: usize = 10;

/// Sentinel tag carried by declared ORM/data model values.
pub const MODEL_TAG: &str = "MT";

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        field_map::{FieldMap, Fields},
        node::*,
        types::{ArgSource, IndexType, ScalarKind},
        value::truthy,
    };
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
}

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),

    #[error("duplicate enum name '{name}' declared in '{first}' and '{second}'")]
    DuplicateEnum {
        name: String,
        first: String,
        second: String,
    },
}
