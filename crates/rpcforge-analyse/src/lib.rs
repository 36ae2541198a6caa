//! Declaration registry, scanning and method analysis.
//!
//! Declarations are read into a [`decl::Registry`], walked by the
//! [`scanner::Scanner`], normalized through the [`adapter::TypeAdapter`] and
//! assembled into sorted [`MetaData`](rpcforge_schema::node::MetaData).

pub mod adapter;
pub mod analyser;
pub mod assembler;
pub mod decl;
pub mod doc;
pub mod enums;
pub mod loader;
pub mod scanner;

use rpcforge_schema::SchemaError;
use thiserror::Error as ThisError;

///
/// AnalyseError
///

#[derive(Debug, ThisError)]
pub enum AnalyseError {
    #[error("found service {service} definition without implement code")]
    MissingImpl { service: String },

    #[error(
        "method '{method}' of class '{class}' has {positional} positional parameters but only {annotated} annotated; add type annotations for [{missing}] (parameters: [{params}])"
    )]
    MissingAnnotations {
        class: String,
        method: String,
        positional: usize,
        annotated: usize,
        missing: String,
        params: String,
    },

    #[error("parameter '{param}' of '{class}.{method}' has no type definition")]
    UntypedParam {
        class: String,
        method: String,
        param: String,
    },

    #[error("cannot read declarations at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
