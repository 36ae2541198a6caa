use rpcforge_analyse::AnalyseError;
use rpcforge_build::BuildError;
use rpcforge_schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error(transparent)]
    Analyse(#[from] AnalyseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("cannot read config '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{what} '{}' does not exist", path.display())]
    MissingPath { what: &'static str, path: PathBuf },

    #[error("cannot derive a project name from '{source_path}'")]
    ProjectName { source_path: String },

    #[error("protocol compiler '{command}' can not be found")]
    ProtocNotFound { command: String },

    #[error("protocol compiler failed on '{}' ({status})", file.display())]
    ProtocFailed { file: PathBuf, status: String },

    #[error("protocol compiler command is empty")]
    ProtocEmpty,

    #[error("can not find the git command for '{action}'")]
    GitNotFound { action: String },

    #[error("cannot run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine the working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error("logging is already initialized")]
    Logging,
}
