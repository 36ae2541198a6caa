//! Command line arguments and their validation.

use crate::{
    CliError,
    config::Config,
    paths::{absolutize, existing, project_name},
    worker::{rpc::RpcOptions, web::WebOptions},
};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Generate RPC servers, clients, web resources and ORM modules from
/// exported service declarations.
#[derive(Debug, Parser)]
#[command(name = "rpcforge", version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "RPCFORGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the RPC server and client for a project
    Rpc(RpcArgs),

    /// Generate web resources, enum modules and ORM modules
    Web(WebArgs),
}

///
/// RpcArgs
///

#[derive(Debug, Args)]
pub struct RpcArgs {
    /// Project to generate for; its repository or path in detached mode
    #[arg(short, long)]
    pub source_project_path: String,

    /// Existing client project receiving the client code
    #[arg(short, long)]
    pub client_output_path: Option<String>,

    /// Do not generate the server inside the source project
    #[arg(long)]
    pub no_server_code: bool,

    /// Require an implementation class for every service
    #[arg(long)]
    pub need_impl: bool,

    /// Generate a detached server here, with the source as a submodule
    #[arg(short, long)]
    pub outside_server_path: Option<String>,

    /// Directory holding the declaration documents
    #[arg(long)]
    pub declarations: Option<String>,

    /// Skip every git call
    #[arg(long)]
    pub skip_vcs: bool,

    /// Skip the protocol compiler
    #[arg(long)]
    pub skip_protoc: bool,
}

impl RpcArgs {
    pub fn resolve(&self, cwd: &Path, home: Option<&Path>) -> Result<RpcOptions, CliError> {
        let outside = self
            .outside_server_path
            .as_deref()
            .map(|raw| absolutize(raw, cwd, home));

        // a detached source may be a repository address
        let source = match &outside {
            Some(_) => {
                let local = absolutize(&self.source_project_path, cwd, home);
                if local.exists() {
                    local.display().to_string()
                } else {
                    self.source_project_path.clone()
                }
            }
            None => {
                let local = absolutize(&self.source_project_path, cwd, home);
                existing("source project path", local)?.display().to_string()
            }
        };

        let client = self
            .client_output_path
            .as_deref()
            .map(|raw| existing("client output path", absolutize(raw, cwd, home)))
            .transpose()?;
        let declarations = self
            .declarations
            .as_deref()
            .map(|raw| existing("declaration directory", absolutize(raw, cwd, home)))
            .transpose()?;

        let options = RpcOptions {
            project: project_name(&source)?,
            server_code: outside.is_none() && !self.no_server_code,
            source,
            client,
            need_impl: self.need_impl,
            outside,
            declarations,
            skip_vcs: self.skip_vcs,
            skip_protoc: self.skip_protoc,
        };
        info!(
            project = %options.project,
            source = %options.source,
            detached = ?options.outside,
            client = ?options.client,
            server_code = options.server_code,
            "rpc generation"
        );

        Ok(options)
    }
}

///
/// WebArgs
///

#[derive(Debug, Args)]
pub struct WebArgs {
    /// Project whose declarations are scanned
    #[arg(short, long)]
    pub source_project_path: String,

    /// Directory receiving the web resource modules
    #[arg(short, long)]
    pub api_output: String,

    /// Directory receiving the ORM modules
    #[arg(short, long)]
    pub model_output: Option<String>,

    /// Keep only models whose module name contains this text
    #[arg(long)]
    pub model_filter: Option<String>,

    /// File receiving the enum holder classes
    #[arg(short, long)]
    pub enum_gen_path: Option<String>,
}

impl WebArgs {
    pub fn resolve(
        &self,
        config: &Config,
        cwd: &Path,
        home: Option<&Path>,
    ) -> Result<WebOptions, CliError> {
        let source = existing(
            "source project path",
            absolutize(&self.source_project_path, cwd, home),
        )?;
        let enum_gen_path = self
            .enum_gen_path
            .as_deref()
            .unwrap_or(&config.web.enum_gen_path);

        Ok(WebOptions {
            source,
            api_output: absolutize(&self.api_output, cwd, home),
            model_output: self
                .model_output
                .as_deref()
                .map(|raw| absolutize(raw, cwd, home)),
            model_filter: self
                .model_filter
                .clone()
                .unwrap_or_else(|| config.web.model_filter.clone()),
            enum_gen_path: absolutize(enum_gen_path, cwd, home),
        })
    }
}

///
/// TESTS
///
