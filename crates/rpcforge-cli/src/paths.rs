//! Command line path handling.

use crate::CliError;
use std::path::{Path, PathBuf};

/// Absolute form of a user-supplied path. A leading `~/` expands to `home`;
/// other relative paths are joined to `cwd`.
#[must_use]
pub fn absolutize(raw: &str, cwd: &Path, home: Option<&Path>) -> PathBuf {
    if let (Some(rest), Some(home)) = (raw.strip_prefix("~/"), home) {
        return home.join(rest);
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Last path segment with a trailing `.git` removed.
pub fn project_name(source: &str) -> Result<String, CliError> {
    let trimmed = source.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() || name == "." || name == ".." {
        return Err(CliError::ProjectName {
            source_path: source.to_string(),
        });
    }

    Ok(name.to_string())
}

/// `path` when it exists, otherwise a [`CliError::MissingPath`].
pub fn existing(what: &'static str, path: PathBuf) -> Result<PathBuf, CliError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(CliError::MissingPath { what, path })
    }
}

/// Home directory from the environment.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

///
/// TESTS
///
