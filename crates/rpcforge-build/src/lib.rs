//! Source emitters for assembled service metadata.
//!
//! Each emitter module exposes a `generate` function taking a
//! [`ServiceBuilder`] (or the collection it needs) and returning file text.
//! Nothing here touches the filesystem except [`layout`].

pub mod enums;
pub mod layout;
pub mod mapping;
pub mod orm;
pub mod proto;
pub mod python;
pub mod registry;
pub mod shape;
pub mod web;
pub mod writer;

use rpcforge_schema::{
    naming::{file_stem, pretty_name},
    node::{ClassRef, MetaData},
};
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error(
        "get method '{service}.{entry}' cannot take nested parameter '{param}'; use a post method instead"
    )]
    NestedGetParam {
        service: String,
        entry: String,
        param: String,
    },

    #[error("enum declared in '{module}' has no name")]
    UnnamedEnum { module: String },

    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

///
/// GeneratedFile
/// emitted text and its path relative to an output root
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

///
/// BuildOptions
/// project-wide values threaded into generated sources
///

#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Project name recorded on generated client and servicer classes.
    pub from_project: String,

    /// Python module of the runtime package used by definition modules.
    pub runtime_path: String,

    /// Python module exporting the web `api` handle and ORM `meta_data`.
    pub api_path: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            from_project: String::new(),
            runtime_path: "runtime".to_string(),
            api_path: "src".to_string(),
        }
    }
}

///
/// ServiceBuilder
///

#[derive(Clone, Copy, Debug)]
pub struct ServiceBuilder<'a> {
    pub meta: &'a MetaData,
    pub options: &'a BuildOptions,
}

impl<'a> ServiceBuilder<'a> {
    #[must_use]
    pub const fn new(meta: &'a MetaData, options: &'a BuildOptions) -> Self {
        Self { meta, options }
    }

    /// Lowercase stem shared by the descriptor, encode and impl modules.
    #[must_use]
    pub fn stem(&self) -> String {
        file_stem(&self.meta.name)
    }

    /// Class name of the generated client and servicer.
    #[must_use]
    pub fn class_name(&self) -> String {
        pretty_name(&self.meta.name)
    }

    #[must_use]
    pub const fn implementation(&self) -> Option<&'a ClassRef> {
        self.meta.implementation.as_ref()
    }
}

///
/// TEST SUPPORT
///
