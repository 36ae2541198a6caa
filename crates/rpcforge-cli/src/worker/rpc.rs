//! RPC server and client generation.

use crate::{
    CliError,
    config::Config,
    git::Git,
    protoc::Protoc,
    worker::{Discovery, discover},
};
use rpcforge_build::{
    BuildOptions, ServiceBuilder,
    layout::{Layout, package_dirs, read_existing, write_file},
    proto,
    python::{self, Side},
    registry,
};
use std::path::{Path, PathBuf};
use tracing::info;

const REGISTRATION_FILE: &str = "__init__.py";
const LAUNCHER_FILE: &str = "rpc_server.py";

///
/// RpcOptions
/// validated `rpc` command arguments
///

#[derive(Clone, Debug)]
pub struct RpcOptions {
    /// Source project directory, or its repository in detached mode.
    pub source: String,

    /// Name recorded on generated code and used as the registration block.
    pub project: String,

    pub client: Option<PathBuf>,

    /// Generate the server in place inside the source project.
    pub server_code: bool,

    pub need_impl: bool,

    /// Detached server directory.
    pub outside: Option<PathBuf>,

    /// Declaration directory override.
    pub declarations: Option<PathBuf>,

    pub skip_vcs: bool,
    pub skip_protoc: bool,
}

///
/// RpcReport
///

#[derive(Debug, Default)]
pub struct RpcReport {
    pub services: Vec<String>,
    pub written: Vec<PathBuf>,
}

///
/// RpcWorker
///

pub struct RpcWorker<'a> {
    options: &'a RpcOptions,
    config: &'a Config,
    git: Git,
    protoc: Protoc<'a>,
}

impl<'a> RpcWorker<'a> {
    #[must_use]
    pub const fn new(options: &'a RpcOptions, config: &'a Config) -> Self {
        Self {
            options,
            config,
            git: Git::new(!options.skip_vcs),
            protoc: Protoc::new(&config.protoc, !options.skip_protoc),
        }
    }

    pub fn run(&self) -> Result<RpcReport, CliError> {
        let root = self.declaration_root()?;
        let Discovery { metas, .. } = discover(&root, &self.config.scan, self.options.need_impl)?;

        let build = BuildOptions {
            from_project: self.options.project.clone(),
            runtime_path: self.config.web.runtime_path.clone(),
            api_path: self.config.web.api_path.clone(),
        };
        let builders: Vec<_> = metas.iter().map(|m| ServiceBuilder::new(m, &build)).collect();

        let mut report = RpcReport {
            services: metas.iter().map(|m| m.name.clone()).collect(),
            ..RpcReport::default()
        };

        for target in self.server_targets() {
            self.server(&target, &builders, &mut report)?;
        }
        if let Some(client) = &self.options.client {
            self.client(client, &builders, &mut report)?;
        }
        info!(
            project = %self.options.project,
            services = report.services.len(),
            files = report.written.len(),
            "rpc generation finished"
        );

        Ok(report)
    }

    // declaration_root
    // detached mode first brings the source in as a submodule
    fn declaration_root(&self) -> Result<PathBuf, CliError> {
        if let Some(outside) = &self.options.outside {
            let name = &self.options.project;
            self.git.ensure_repo(outside)?;
            self.git.submodule_add(outside, &self.options.source, name)?;
            self.git.submodule_update(outside, true, Some(name))?;
        }

        if let Some(declarations) = &self.options.declarations {
            return Ok(declarations.clone());
        }

        Ok(match &self.options.outside {
            Some(outside) => outside.join(&self.options.project),
            None => PathBuf::from(&self.options.source),
        })
    }

    fn server_targets(&self) -> Vec<PathBuf> {
        match &self.options.outside {
            Some(outside) => vec![outside.clone()],
            None if self.options.server_code => vec![PathBuf::from(&self.options.source)],
            None => Vec::new(),
        }
    }

    // server
    fn server(
        &self,
        target: &Path,
        builders: &[ServiceBuilder],
        report: &mut RpcReport,
    ) -> Result<(), CliError> {
        let layout = Layout::server(target);
        layout.ensure()?;
        self.git.ensure_runtime(&layout, &self.config.runtime)?;

        for builder in builders {
            self.descriptor(&layout, builder, report)?;
            emit(
                report,
                &layout.join(format!("{}.py", builder.stem())),
                &python::server::generate(builder),
            )?;
            emit(
                report,
                &layout.impl_dir.join(format!("{}.py", builder.stem())),
                &python::impl_module(builder, Side::Server),
            )?;
        }

        let registration_path = layout.join(REGISTRATION_FILE);
        let existing = read_existing(&registration_path)?;
        let body = registry::project_body(builders);
        emit(
            report,
            &registration_path,
            &registry::registration(&existing, &self.options.project, &body),
        )?;

        let packages = match &self.options.outside {
            Some(outside) => Some(package_dirs(outside)?),
            None => None,
        };
        emit(
            report,
            &layout.base.join(LAUNCHER_FILE),
            &registry::launcher(packages.as_deref()),
        )?;

        Ok(())
    }

    // client
    fn client(
        &self,
        client: &Path,
        builders: &[ServiceBuilder],
        report: &mut RpcReport,
    ) -> Result<(), CliError> {
        let layout = Layout::client(client);
        layout.ensure()?;
        self.git.ensure_runtime(&layout, &self.config.runtime)?;

        for builder in builders {
            self.descriptor(&layout, builder, report)?;
            emit(
                report,
                &layout.join(format!("{}.py", builder.stem())),
                &python::client::generate(builder),
            )?;
            emit(
                report,
                &layout.impl_dir.join(format!("{}.py", builder.stem())),
                &python::impl_module(builder, Side::Client),
            )?;
        }

        Ok(())
    }

    // descriptor
    fn descriptor(
        &self,
        layout: &Layout,
        builder: &ServiceBuilder,
        report: &mut RpcReport,
    ) -> Result<(), CliError> {
        let (file_name, text) = proto::generate(builder);
        let path = layout.mid_file.join(file_name);
        emit(report, &path, &text)?;

        self.protoc.compile(layout, &path, &builder.stem())
    }
}

fn emit(report: &mut RpcReport, path: &Path, text: &str) -> Result<(), CliError> {
    write_file(path, text)?;
    report.written.push(path.to_path_buf());

    Ok(())
}
