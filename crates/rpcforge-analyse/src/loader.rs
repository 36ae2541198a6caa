//! Reading declaration documents from a project tree.

use crate::{
    AnalyseError,
    decl::{Declarations, Registry},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Default suffix of exported declaration documents.
pub const DECLARATION_SUFFIX: &str = ".rpc.json";

///
/// LoadReport
///

#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Load every declaration document below `root`. A document that cannot be
/// read or parsed is logged and skipped; an unreadable root is an error.
pub fn load_dir(root: &Path, suffix: &str) -> Result<(Registry, LoadReport), AnalyseError> {
    let mut files = Vec::new();
    collect_files(root, suffix, &mut files).map_err(|source| AnalyseError::Io {
        path: root.display().to_string(),
        source,
    })?;
    files.sort();

    let mut registry = Registry::new();
    let mut report = LoadReport::default();

    for path in files {
        match load_file(&path) {
            Ok(decls) => {
                debug!(
                    path = %path.display(),
                    modules = decls.modules.len(),
                    "declarations loaded"
                );
                registry.extend(decls);
                report.loaded.push(path);
            }
            Err(message) => {
                warn!(path = %path.display(), error = %message, "skipping declaration document");
                report.skipped.push((path, message));
            }
        }
    }

    Ok((registry, report))
}

// load_file
fn load_file(path: &Path) -> Result<Declarations, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;

    serde_json::from_str(&text).map_err(|e| e.to_string())
}

// collect_files
// hidden directories are not descended into
fn collect_files(dir: &Path, suffix: &str, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if !name.starts_with('.') {
                collect_files(&path, suffix, out)?;
            }
        } else if name.ends_with(suffix) {
            out.push(path);
        }
    }

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_valid_documents_and_skips_broken_ones() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("pkg");
        fs::create_dir_all(&nested).expect("create pkg");

        fs::write(
            dir.path().join("app.rpc.json"),
            r#"{"modules": [{"name": "app", "attrs": {}}]}"#,
        )
        .expect("write app");
        fs::write(
            nested.join("svc.rpc.json"),
            r#"{"modules": [{"name": "app.svc", "attrs": {}}]}"#,
        )
        .expect("write svc");
        fs::write(nested.join("broken.rpc.json"), "{not json").expect("write broken");
        fs::write(nested.join("notes.json"), "{}").expect("write unrelated");

        let (registry, report) = load_dir(dir.path(), DECLARATION_SUFFIX).expect("loads");

        assert_eq!(registry.len(), 2);
        assert!(registry.get("app.svc").is_some());
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("broken.rpc.json"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_dir(&dir.path().join("absent"), DECLARATION_SUFFIX)
            .expect_err("missing root must fail");

        assert!(
            err.to_string().contains("cannot read declarations"),
            "unexpected error: {err}"
        );
    }
}
