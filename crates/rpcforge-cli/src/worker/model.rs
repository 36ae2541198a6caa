//! ORM module generation.

use crate::CliError;
use rpcforge_build::{
    layout::{ensure_package, write_files},
    orm,
};
use rpcforge_schema::node::ModelWithVar;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the ORM package for `models` into `output`, keeping models whose
/// module name contains `filter`.
pub fn run(
    models: &[ModelWithVar],
    output: &Path,
    api_path: &str,
    filter: &str,
) -> Result<Vec<PathBuf>, CliError> {
    ensure_package(output)?;

    let files = orm::generate(models, api_path, filter);
    write_files(output, &files)?;
    info!(output = %output.display(), files = files.len(), "orm modules written");

    Ok(files.iter().map(|f| output.join(&f.path)).collect())
}
