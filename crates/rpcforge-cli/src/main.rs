use clap::Parser;
use rpcforge_cli::{CliError, cli::Cli, logging};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let result = std::env::current_dir()
        .map_err(CliError::WorkingDir)
        .and_then(|cwd| rpcforge_cli::run(&cli, &cwd));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
