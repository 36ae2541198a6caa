//! Protocol compiler invocation.

use crate::{CliError, config::ProtocConfig};
use regex::Regex;
use rpcforge_build::layout::{Layout, read_existing, write_file};
use std::{io::ErrorKind, path::Path, process::Command};
use tracing::{debug, info};

///
/// Protoc
///

#[derive(Clone, Copy, Debug)]
pub struct Protoc<'a> {
    config: &'a ProtocConfig,
    enabled: bool,
}

impl<'a> Protoc<'a> {
    #[must_use]
    pub const fn new(config: &'a ProtocConfig, enabled: bool) -> Self {
        Self {
            config,
            enabled: enabled && config.enabled,
        }
    }

    /// Compile `proto` (inside the layout's `mid_file`) into `encode`, then
    /// make the generated service module import its messages relatively.
    pub fn compile(&self, layout: &Layout, proto: &Path, stem: &str) -> Result<(), CliError> {
        if !self.enabled {
            debug!(file = %proto.display(), "protocol compiler disabled");
            return Ok(());
        }

        let argv = self.config.argv();
        let (program, leading) = argv.split_first().ok_or(CliError::ProtocEmpty)?;

        let status = Command::new(program)
            .args(leading)
            .arg(format!("-I{}", layout.mid_file.display()))
            .arg(format!("--python_out={}", layout.encode.display()))
            .arg(format!("--grpc_python_out={}", layout.encode.display()))
            .arg(proto)
            .status()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => CliError::ProtocNotFound {
                    command: self.config.command.clone(),
                },
                _ => CliError::Spawn {
                    program: self.config.command.clone(),
                    source,
                },
            })?;
        if !status.success() {
            return Err(CliError::ProtocFailed {
                file: proto.to_path_buf(),
                status: status.to_string(),
            });
        }
        info!(file = %proto.display(), "descriptor compiled");

        rewrite_grpc_module(&layout.encode, stem)?;

        Ok(())
    }
}

/// Rewrite `<stem>_pb2_grpc.py` in `dir` to a relative message import.
/// Returns whether the file changed.
pub fn rewrite_grpc_module(dir: &Path, stem: &str) -> Result<bool, CliError> {
    let path = dir.join(format!("{stem}_pb2_grpc.py"));
    let text = read_existing(&path)?;

    match relative_import(&text, stem) {
        Some(rewritten) => {
            write_file(&path, &rewritten)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// `text` with `import <stem>_pb2 as <stem>__pb2` made relative, or `None`
/// when no such line exists.
#[must_use]
pub fn relative_import(text: &str, stem: &str) -> Option<String> {
    let pattern = format!(
        r"(?m)^import {0}_pb2 as {0}__pb2$",
        regex::escape(stem)
    );
    let re = Regex::new(&pattern).ok()?;
    if !re.is_match(text) {
        return None;
    }

    let replacement = format!("from . import {stem}_pb2 as {stem}__pb2");
    Some(re.replace(text, regex::NoExpand(&replacement)).into_owned())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GRPC_MODULE: &str = "\
# Generated by the gRPC Python protocol compiler plugin. DO NOT EDIT!
import grpc

import demo_pb2 as demo__pb2


class DemoStub(object):
    pass
";

    #[test]
    fn absolute_import_becomes_relative() {
        let text = relative_import(GRPC_MODULE, "demo").expect("import found");

        assert!(text.contains("\nfrom . import demo_pb2 as demo__pb2\n"));
        assert!(!text.contains("\nimport demo_pb2"));
        assert!(text.ends_with("class DemoStub(object):\n    pass\n"));
        assert_eq!(relative_import(&text, "demo"), None, "already relative");
        assert_eq!(relative_import(GRPC_MODULE, "other"), None);
    }

    #[test]
    fn rewrite_leaves_missing_modules_alone() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(!rewrite_grpc_module(dir.path(), "demo").expect("no module"));

        fs::write(dir.path().join("demo_pb2_grpc.py"), GRPC_MODULE).expect("write module");
        assert!(rewrite_grpc_module(dir.path(), "demo").expect("rewritten"));
        assert!(
            fs::read_to_string(dir.path().join("demo_pb2_grpc.py"))
                .expect("read module")
                .contains("from . import demo_pb2 as demo__pb2")
        );
    }

    #[test]
    fn disabled_compiler_is_skipped() {
        let config = ProtocConfig {
            command: "definitely-not-a-protoc".to_string(),
            enabled: true,
        };
        let layout = Layout::server(Path::new("/nowhere"));

        Protoc::new(&config, false)
            .compile(&layout, Path::new("/nowhere/demo.proto"), "demo")
            .expect("skipped");
    }

    #[test]
    fn missing_compiler_is_fatal() {
        let config = ProtocConfig {
            command: "rpcforge-missing-protoc --flag".to_string(),
            enabled: true,
        };
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = Layout::server(dir.path());

        let err = Protoc::new(&config, true)
            .compile(&layout, &dir.path().join("demo.proto"), "demo")
            .expect_err("missing executable");
        assert!(matches!(err, CliError::ProtocNotFound { .. }), "unexpected error: {err}");
    }
}
