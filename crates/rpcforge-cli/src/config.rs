//! TOML configuration.
//!
//! Every section and field is optional; missing values take the defaults
//! below. The resolved value is passed explicitly to the workers.

use crate::CliError;
use rpcforge_analyse::loader::DECLARATION_SUFFIX;
use rpcforge_schema::MAX_SCAN_DEPTH;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub protoc: ProtocConfig,
    pub scan: ScanConfig,
    pub web: WebConfig,
}

impl Config {
    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");

        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

///
/// RuntimeConfig
/// the runtime library checked out as a submodule of each layout
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Submodule source; empty skips adding the submodule.
    pub repo: String,
    pub branch: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: "master".to_string(),
        }
    }
}

///
/// ProtocConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocConfig {
    /// Program and leading arguments, split on whitespace.
    pub command: String,
    pub enabled: bool,
}

impl ProtocConfig {
    #[must_use]
    pub fn argv(&self) -> Vec<&str> {
        self.command.split_whitespace().collect()
    }
}

impl Default for ProtocConfig {
    fn default() -> Self {
        Self {
            command: "python -m grpc_tools.protoc".to_string(),
            enabled: true,
        }
    }
}

///
/// ScanConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub suffix: String,
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffix: DECLARATION_SUFFIX.to_string(),
            max_depth: MAX_SCAN_DEPTH,
        }
    }
}

///
/// WebConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    pub runtime_path: String,
    pub api_path: String,
    pub enum_gen_path: String,
    pub model_filter: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            runtime_path: "runtime".to_string(),
            api_path: "src".to_string(),
            enum_gen_path: "enum.py".to_string(),
            model_filter: String::new(),
        }
    }
}

///
/// TESTS
///
