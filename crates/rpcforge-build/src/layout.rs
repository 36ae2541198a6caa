//! Output directory layouts.
//!
//! A server layout lives under `<base>/rpc/`; a client layout lives directly
//! under the client project with its generated packages below `src/`.

use crate::{BuildError, GeneratedFile};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

const PACKAGE_INIT: &str = "__init__.py";

///
/// LayoutKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutKind {
    Server,
    Client,
}

///
/// Layout
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub kind: LayoutKind,

    /// Project directory the layout was derived from.
    pub base: PathBuf,

    /// Stub modules and the registration file.
    pub root: PathBuf,

    /// Descriptor files fed to the protocol compiler.
    pub mid_file: PathBuf,

    /// Protocol compiler output.
    pub encode: PathBuf,

    /// Data-class modules.
    pub impl_dir: PathBuf,

    /// Runtime submodule checkout.
    pub runtime: PathBuf,
}

impl Layout {
    #[must_use]
    pub fn server(base: &Path) -> Self {
        let root = base.join("rpc");

        Self {
            kind: LayoutKind::Server,
            base: base.to_path_buf(),
            mid_file: root.join("mid_file"),
            encode: root.join("encode"),
            impl_dir: root.join("impl"),
            runtime: root.join("runtime"),
            root,
        }
    }

    #[must_use]
    pub fn client(client: &Path) -> Self {
        let src = client.join("src");

        Self {
            kind: LayoutKind::Client,
            base: client.to_path_buf(),
            root: client.to_path_buf(),
            mid_file: src.join("mid_file"),
            encode: src.join("encode"),
            impl_dir: src.join("impl"),
            runtime: client.join("runtime"),
        }
    }

    /// Create the generated package directories, each with an `__init__.py`.
    /// The server root is left to the registration file.
    pub fn ensure(&self) -> Result<(), BuildError> {
        if self.kind == LayoutKind::Client {
            ensure_package(&self.root)?;
        }
        for dir in [&self.mid_file, &self.encode, &self.impl_dir] {
            ensure_package(dir)?;
        }

        Ok(())
    }

    #[must_use]
    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

/// Create `dir` and an empty `__init__.py` inside it when absent.
pub fn ensure_package(dir: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

    let init = dir.join(PACKAGE_INIT);
    if !init.exists() {
        fs::write(&init, "").map_err(|source| io_error(&init, source))?;
    }

    Ok(())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    fs::write(path, contents).map_err(|source| io_error(path, source))?;
    debug!(path = %path.display(), bytes = contents.len(), "written");

    Ok(())
}

/// Write every file relative to `root`.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<(), BuildError> {
    for file in files {
        write_file(&root.join(&file.path), &file.contents)?;
    }

    Ok(())
}

/// Contents of `path`, or an empty string when it does not exist yet.
pub fn read_existing(path: &Path) -> Result<String, BuildError> {
    if !path.exists() {
        return Ok(String::new());
    }

    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

/// Sorted names of the Python package directories directly under `root`,
/// excluding the generated `rpc` package.
pub fn package_dirs(root: &Path) -> Result<Vec<String>, BuildError> {
    let entries = fs::read_dir(root).map_err(|source| io_error(root, source))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(root, source))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if name != "rpc" && path.is_dir() && path.join(PACKAGE_INIT).exists() {
            dirs.push(name);
        }
    }
    dirs.sort();

    Ok(dirs)
}

fn io_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

///
/// TESTS
///
