//! Command line front end: configuration, logging, external tools and the
//! workers that drive the analyser and emitters.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod paths;
pub mod protoc;
pub mod worker;

pub use error::CliError;

use crate::{
    cli::{Cli, Command},
    config::Config,
    worker::{rpc::RpcWorker, web},
};
use std::path::Path;
use tracing::info;

/// Run a parsed command line from `cwd`.
pub fn run(cli: &Cli, cwd: &Path) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let home = paths::home_dir();

    match &cli.command {
        Command::Rpc(args) => {
            let options = args.resolve(cwd, home.as_deref())?;
            let report = RpcWorker::new(&options, &config).run()?;
            info!(services = ?report.services, "done");
        }
        Command::Web(args) => {
            let options = args.resolve(&config, cwd, home.as_deref())?;
            let written = web::run(&options, &config)?;
            info!(files = written.len(), "done");
        }
    }

    Ok(())
}
