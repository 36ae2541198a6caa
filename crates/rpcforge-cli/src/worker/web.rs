//! Web resource, argument-definition and enum module generation.

use crate::{
    CliError,
    config::{Config, WebConfig},
    worker::{Discovery, discover, model},
};
use rpcforge_analyse::enums::collect_enums;
use rpcforge_build::{
    BuildOptions, GeneratedFile, ServiceBuilder, enums,
    layout::{ensure_package, write_file, write_files},
    web,
};
use rpcforge_schema::node::{EnumSet, MetaData};
use std::path::{Path, PathBuf};
use tracing::info;

const API_REGISTRY: &str = "api_reg.py";
const ENUM_RESOURCES: &str = "ss_enum.py";

///
/// WebOptions
/// validated `web` command arguments
///

#[derive(Clone, Debug)]
pub struct WebOptions {
    pub source: PathBuf,
    pub api_output: PathBuf,
    pub model_output: Option<PathBuf>,
    pub model_filter: String,
    pub enum_gen_path: PathBuf,
}

/// Scan without requiring implementations, then write the web modules and,
/// when an output is given, the ORM modules.
pub fn run(options: &WebOptions, config: &Config) -> Result<Vec<PathBuf>, CliError> {
    let Discovery { scan, metas, .. } = discover(&options.source, &config.scan, false)?;

    let worker = WebWorker {
        output: &options.api_output,
        enum_holders: &options.enum_gen_path,
        config: &config.web,
    };
    let mut written = worker.run(&metas, &scan.enums)?;

    if let Some(model_output) = &options.model_output {
        written.extend(model::run(
            &scan.models,
            model_output,
            &config.web.api_path,
            &options.model_filter,
        )?);
    }

    Ok(written)
}

///
/// WebWorker
///

pub struct WebWorker<'a> {
    pub output: &'a Path,
    pub enum_holders: &'a Path,
    pub config: &'a WebConfig,
}

impl WebWorker<'_> {
    /// Write every module and return their paths.
    pub fn run(&self, metas: &[MetaData], scanned: &EnumSet) -> Result<Vec<PathBuf>, CliError> {
        let options = BuildOptions {
            from_project: String::new(),
            runtime_path: self.config.runtime_path.clone(),
            api_path: self.config.api_path.clone(),
        };

        ensure_package(self.output)?;
        let mut files = Vec::new();
        for meta in metas {
            let generated = web::generate(&ServiceBuilder::new(meta, &options))?;
            for file in &generated {
                self.ensure_packages(file)?;
            }
            files.extend(generated);
        }
        files.push(GeneratedFile::new(API_REGISTRY, web::api_registry(metas)));

        let enum_set = collect_enums(metas, scanned)?;
        let enum_files = enums::generate(&enum_set.into_vec(), &self.config.api_path)?;
        files.push(GeneratedFile::new(ENUM_RESOURCES, enum_files.resources));

        write_files(self.output, &files)?;
        write_file(self.enum_holders, &enum_files.holders)?;

        let mut written: Vec<PathBuf> = files.iter().map(|f| self.output.join(&f.path)).collect();
        written.push(self.enum_holders.to_path_buf());
        info!(
            output = %self.output.display(),
            services = metas.len(),
            files = written.len(),
            "web modules written"
        );

        Ok(written)
    }

    // ensure_packages
    // every directory between the output root and a module is a package
    fn ensure_packages(&self, file: &GeneratedFile) -> Result<(), CliError> {
        let mut dir = self.output.to_path_buf();
        if let Some(parent) = file.path.parent() {
            for segment in parent.iter() {
                dir.push(segment);
                ensure_package(&dir)?;
            }
        }

        Ok(())
    }
}
