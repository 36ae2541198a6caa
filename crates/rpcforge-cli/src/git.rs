//! Submodule plumbing through the `git` executable.

use crate::{CliError, config::RuntimeConfig};
use rpcforge_build::{BuildError, layout::Layout};
use std::{
    fs,
    io::ErrorKind,
    path::Path,
    process::{Command, Stdio},
};
use tracing::{debug, info, warn};

const GIT: &str = "git";

///
/// Git
///

#[derive(Clone, Copy, Debug)]
pub struct Git {
    enabled: bool,
}

impl Git {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create `dir` and initialize a repository in it when it does not exist.
    pub fn ensure_repo(&self, dir: &Path) -> Result<(), CliError> {
        if dir.exists() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if self.enabled {
            run_git(dir, &["init"], false)?;
        }

        Ok(())
    }

    /// Add `source` as submodule `name` of `dir` unless that path exists.
    pub fn submodule_add(&self, dir: &Path, source: &str, name: &str) -> Result<(), CliError> {
        if !self.enabled || dir.join(name).exists() {
            return Ok(());
        }
        run_git(dir, &["submodule", "add", source, name], false)?;

        Ok(())
    }

    /// `git submodule update --init --remote`, optionally recursive and
    /// restricted to one path.
    pub fn submodule_update(
        &self,
        dir: &Path,
        recursive: bool,
        path: Option<&str>,
    ) -> Result<(), CliError> {
        if !self.enabled {
            return Ok(());
        }

        let mut args = vec!["submodule", "update", "--init", "--remote"];
        if recursive {
            args.push("--recursive");
        }
        if let Some(path) = path {
            args.extend(["--", path]);
        }
        run_git(dir, &args, false)?;

        Ok(())
    }

    /// Make sure the layout's runtime submodule is present, then update all
    /// submodules. Failures while creating the runtime are only logged.
    pub fn ensure_runtime(&self, layout: &Layout, runtime: &RuntimeConfig) -> Result<(), CliError> {
        if !self.enabled {
            debug!(root = %layout.root.display(), "version control disabled");
            return Ok(());
        }

        if !layout.runtime.exists() {
            add_runtime(layout, runtime);
        }
        self.submodule_update(&layout.root, true, None)
    }
}

// add_runtime
fn add_runtime(layout: &Layout, runtime: &RuntimeConfig) {
    if runtime.repo.is_empty() {
        warn!(
            path = %layout.runtime.display(),
            "runtime repository is not configured; skipping submodule add"
        );
        return;
    }

    // stale index entries from an earlier failed run block the add
    let runtime_path = layout.runtime.to_string_lossy().into_owned();
    let _ = run_git(&layout.base, &["rm", "-r", "--cached", "rpc"], true);
    let _ = run_git(
        &layout.base,
        &["submodule", "deinit", runtime_path.as_str(), "-f"],
        true,
    );

    let add = [
        "submodule",
        "add",
        "-f",
        "-b",
        runtime.branch.as_str(),
        runtime.repo.as_str(),
        "runtime",
    ];
    let added = run_git(&layout.root, &add, true);
    match added {
        Ok(true) => {
            info!(repo = %runtime.repo, branch = %runtime.branch, "runtime submodule added");
            let update = ["submodule", "update", "--init", "--remote"];
            if let Err(err) = run_git(&layout.runtime, &update, false) {
                warn!(error = %err, "runtime submodule update failed");
            }
        }
        Ok(false) => warn!(repo = %runtime.repo, "runtime submodule could not be added"),
        Err(err) => warn!(error = %err, "runtime submodule could not be added"),
    }
}

// run_git
// Ok(false) for a non-zero exit; a missing executable is an error
fn run_git(dir: &Path, args: &[&str], quiet: bool) -> Result<bool, CliError> {
    let mut command = Command::new(GIT);
    command.args(args).current_dir(dir);
    if quiet {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    debug!(dir = %dir.display(), args = ?args, "git");
    let status = command.status().map_err(|source| match source.kind() {
        ErrorKind::NotFound => CliError::GitNotFound {
            action: args.join(" "),
        },
        _ => CliError::Spawn {
            program: format!("{GIT} {}", args.join(" ")),
            source,
        },
    })?;
    if !status.success() {
        debug!(dir = %dir.display(), args = ?args, %status, "git exited unsuccessfully");
    }

    Ok(status.success())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_git_only_touches_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let git = Git::new(false);
        let repo = dir.path().join("outside");

        git.ensure_repo(&repo).expect("creates directory");
        assert!(repo.is_dir());
        assert!(!repo.join(".git").exists());

        git.submodule_add(&repo, "/work/shop", "shop").expect("no-op");
        git.submodule_update(&repo, true, Some("shop")).expect("no-op");
        assert!(!repo.join("shop").exists());

        let layout = Layout::server(&repo);
        git.ensure_runtime(&layout, &RuntimeConfig::default()).expect("no-op");
        assert!(!layout.runtime.exists());
    }
}
